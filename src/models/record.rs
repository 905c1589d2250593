//! A parsed clinical document: one patient and everything recorded about them

use serde::Serialize;

use crate::models::diagnosis::Diagnosis;
use crate::models::demographics::Demographics;
use crate::models::hospitalization::Hospitalization;
use crate::models::medication::Medication;
use crate::models::types::RowCounts;

/// All records derived from a single source document.
///
/// Every contained record carries the demographics' `patient_id`; the
/// constructor and the `push_*` methods enforce this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatientRecord {
    demographics: Demographics,
    hospitalizations: Vec<Hospitalization>,
    diagnoses: Vec<Diagnosis>,
    medications: Vec<Medication>,
}

impl PatientRecord {
    /// Bundle a patient's records, stamping each with the patient identifier
    #[must_use]
    pub fn new(
        demographics: Demographics,
        hospitalizations: Vec<Hospitalization>,
        diagnoses: Vec<Diagnosis>,
        medications: Vec<Medication>,
    ) -> Self {
        let mut record = Self {
            demographics,
            hospitalizations: Vec::with_capacity(hospitalizations.len()),
            diagnoses: Vec::with_capacity(diagnoses.len()),
            medications: Vec::with_capacity(medications.len()),
        };
        hospitalizations
            .into_iter()
            .for_each(|h| record.push_hospitalization(h));
        diagnoses.into_iter().for_each(|d| record.push_diagnosis(d));
        medications.into_iter().for_each(|m| record.push_medication(m));
        record
    }

    #[must_use]
    pub fn patient_id(&self) -> &str {
        &self.demographics.patient_id
    }

    #[must_use]
    pub const fn demographics(&self) -> &Demographics {
        &self.demographics
    }

    #[must_use]
    pub fn hospitalizations(&self) -> &[Hospitalization] {
        &self.hospitalizations
    }

    #[must_use]
    pub fn diagnoses(&self) -> &[Diagnosis] {
        &self.diagnoses
    }

    #[must_use]
    pub fn medications(&self) -> &[Medication] {
        &self.medications
    }

    pub fn push_hospitalization(&mut self, mut hospitalization: Hospitalization) {
        hospitalization.patient_id.clone_from(&self.demographics.patient_id);
        self.hospitalizations.push(hospitalization);
    }

    pub fn push_diagnosis(&mut self, mut diagnosis: Diagnosis) {
        diagnosis.patient_id.clone_from(&self.demographics.patient_id);
        self.diagnoses.push(diagnosis);
    }

    pub fn push_medication(&mut self, mut medication: Medication) {
        medication.patient_id.clone_from(&self.demographics.patient_id);
        self.medications.push(medication);
    }

    /// Rows this record produces in each destination table
    #[must_use]
    pub fn row_counts(&self) -> RowCounts {
        RowCounts {
            demographics: 1,
            hospitalizations: self.hospitalizations.len(),
            diagnoses: self.diagnoses.len(),
            medications: self.medications.len(),
        }
    }
}
