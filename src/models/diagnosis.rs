//! Diagnosis entity model

use serde::Serialize;

/// Representation of a coded diagnosis taken from a document's problem list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub patient_id: String,
    /// Normalized `YYYY-MM-DD HH:MM:SS`, or the source text when it could not be parsed
    pub diagnosis_date: String,
    /// ICD-10 diagnosis code
    pub icd10_code: Option<String>,
    pub description: String,
    pub severity: Option<String>,
}
