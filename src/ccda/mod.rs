//! Parsing of C-CDA (HL7 Consolidated CDA) patient documents
//!
//! A document is parsed into an element tree and then mapped onto the four
//! patient record types. Only the patient identifier is mandatory; every
//! other field degrades to absent when the document does not carry it.

pub mod dates;
pub mod document;
pub mod encounters;
pub mod medications;
pub mod patient;
pub mod problems;

use std::path::Path;

use crate::error::{IngestError, Result};
use crate::models::PatientRecord;

pub use document::{XmlElement, parse_document};
pub use encounters::parse_hospitalizations;
pub use medications::parse_medications;
pub use patient::parse_demographics;
pub use problems::parse_diagnoses;

/// Map a parsed document onto patient records
pub fn parse_patient_record(document: &XmlElement) -> Result<PatientRecord> {
    let demographics = parse_demographics(document)?;
    let patient_id = demographics.patient_id.clone();

    Ok(PatientRecord::new(
        demographics,
        parse_hospitalizations(document, &patient_id),
        parse_diagnoses(document, &patient_id),
        parse_medications(document, &patient_id),
    ))
}

/// Parse document text into patient records
pub fn parse_patient_xml(xml: &str) -> Result<PatientRecord> {
    parse_patient_record(&parse_document(xml.trim_start_matches('\u{feff}'))?)
}

/// Read and parse a document file.
///
/// A file that is not valid UTF-8 is reported as a malformed document rather
/// than an IO failure, so it is skipped instead of ending the run.
pub fn load_patient_record(path: &Path) -> Result<PatientRecord> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::io(path, e))?;
    let xml = String::from_utf8(bytes)
        .map_err(|e| IngestError::malformed(format!("{} is not valid UTF-8: {e}", path.display())))?;
    parse_patient_xml(&xml)
}
