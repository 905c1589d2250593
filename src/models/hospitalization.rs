//! Hospitalization (encounter) model

use chrono::NaiveDateTime;
use serde::Serialize;

/// One inpatient stay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hospitalization {
    pub patient_id: String,
    /// Encounter identifier from the source document
    pub hospitalization_id: String,
    pub admission_date: Option<NaiveDateTime>,
    pub discharge_date: Option<NaiveDateTime>,
    /// Facility where the stay took place
    pub hospital_name: Option<String>,
    pub service_details: Option<String>,
}
