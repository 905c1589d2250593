//! Patient record models
//!
//! Four flat record types, one per destination table, all correlated by the
//! patient identifier taken from the source document.

pub mod demographics;
pub mod diagnosis;
pub mod hospitalization;
pub mod medication;
pub mod record;
pub mod types;

// Re-export commonly used types
pub use demographics::Demographics;
pub use diagnosis::Diagnosis;
pub use hospitalization::Hospitalization;
pub use medication::Medication;
pub use record::PatientRecord;
pub use types::{Gender, RowCounts};
