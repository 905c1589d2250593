//! Medication model

use chrono::NaiveDateTime;
use serde::Serialize;

/// Name recorded when a medication entry carries no display name
pub const UNKNOWN_MEDICATION: &str = "Unknown";

/// Instructions recorded when a medication entry carries none
pub const NO_INSTRUCTIONS: &str = "No specific instructions";

/// One prescribed medication
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Medication {
    pub patient_id: String,
    /// Coded medication (typically RxNorm)
    pub medication_code: Option<String>,
    pub medication_name: String,
    /// Dose as "value unit"
    pub dosage: Option<String>,
    /// Rate as "value unit"
    pub frequency: Option<String>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub instructions: String,
}
