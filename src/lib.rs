//! Ingestion of C-CDA patient documents into a relational store.
//!
//! Documents dropped into an incoming directory are parsed into patient
//! demographics, hospitalizations, diagnoses and medications, written to four
//! tables in one transaction per document, and moved to a processed
//! directory once stored.

pub mod ccda;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod store;
pub mod utils;

// Re-export the most common types for easier use
pub use ccda::{load_patient_record, parse_patient_xml};
pub use config::{DatabaseConfig, IngestConfig};
pub use error::{IngestError, Result};
pub use models::{Demographics, Diagnosis, Gender, Hospitalization, Medication, PatientRecord, RowCounts};
pub use pipeline::{IngestReport, IngestWorker};
pub use store::PatientStore;
