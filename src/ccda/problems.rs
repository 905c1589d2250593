//! Diagnoses from the problem list section
//!
//! Problems are read from the section's narrative table, one row per problem,
//! and joined to the coded entry that references the row to obtain the ICD-10
//! code.

use lazy_static::lazy_static;
use regex::Regex;

use crate::ccda::dates::{looks_like_narrative_date, normalize_narrative_date};
use crate::ccda::document::XmlElement;
use crate::models::Diagnosis;

/// Problem section, entries required
pub const PROBLEM_SECTION_TEMPLATE: &str = "2.16.840.1.113883.10.20.22.2.5.1";

/// Problem section, entries optional
pub const PROBLEM_SECTION_TEMPLATE_OPTIONAL: &str = "2.16.840.1.113883.10.20.22.2.5";

/// Severity observation
pub const SEVERITY_OBSERVATION_TEMPLATE: &str = "2.16.840.1.113883.10.20.22.4.8";

const ICD10_CODE_SYSTEM_NAME: &str = "ICD-10";

lazy_static! {
    static ref PROBLEM_ROW_ID: Regex = Regex::new(r"^problem-\d+").unwrap();
}

fn problem_section(document: &XmlElement) -> Option<&XmlElement> {
    document.find_all("section").find(|section| {
        section.has_template(PROBLEM_SECTION_TEMPLATE)
            || section.has_template(PROBLEM_SECTION_TEMPLATE_OPTIONAL)
    })
}

fn row_description(row: &XmlElement, row_id: &str) -> Option<String> {
    let content_id = format!("{row_id}-problem");
    row.find_all("content")
        .find(|content| content.attr("ID") == Some(content_id.as_str()))
        .and_then(XmlElement::all_text)
}

fn row_date(row: &XmlElement) -> Option<String> {
    row.find_all("td").find_map(|cell| {
        let text = cell.find("content")?.text()?;
        looks_like_narrative_date(text).then(|| normalize_narrative_date(text))
    })
}

/// The coded entry whose narrative reference points at `#row_id`
fn referencing_entry<'a>(document: &'a XmlElement, row_id: &str) -> Option<&'a XmlElement> {
    let reference = format!("#{row_id}");
    document.find_all("entry").find(|entry| {
        entry
            .find_all("text")
            .flat_map(|text| text.children_named("reference"))
            .any(|r| r.attr("value") == Some(reference.as_str()))
    })
}

fn icd10_translation(entry: &XmlElement) -> Option<&XmlElement> {
    entry
        .find_all("translation")
        .find(|t| t.attr("codeSystemName") == Some(ICD10_CODE_SYSTEM_NAME))
}

fn severity(entry: &XmlElement) -> Option<String> {
    entry
        .find_all("observation")
        .find(|observation| observation.has_template(SEVERITY_OBSERVATION_TEMPLATE))
        .and_then(|observation| observation.child("value"))
        .and_then(|value| value.attr("displayName"))
        .map(str::to_string)
}

/// Extract diagnoses from the problem section.
///
/// Rows without both a description and a date are skipped. A row whose coded
/// entry is missing still yields a diagnosis, without an ICD-10 code.
#[must_use]
pub fn parse_diagnoses(document: &XmlElement, patient_id: &str) -> Vec<Diagnosis> {
    let Some(section) = problem_section(document) else {
        return Vec::new();
    };
    let Some(tbody) = section.find("tbody") else {
        return Vec::new();
    };

    let mut diagnoses = Vec::new();
    for row in tbody.find_all("tr") {
        let Some(row_id) = row.attr("ID").filter(|id| PROBLEM_ROW_ID.is_match(id)) else {
            continue;
        };

        let (Some(description), Some(diagnosis_date)) = (row_description(row, row_id), row_date(row))
        else {
            log::debug!("Skipping problem row {row_id}: missing description or date");
            continue;
        };

        let entry = referencing_entry(document, row_id);
        let translation = entry.and_then(icd10_translation);

        diagnoses.push(Diagnosis {
            patient_id: patient_id.to_string(),
            diagnosis_date,
            icd10_code: translation
                .and_then(|t| t.attr("code"))
                .map(str::to_string),
            description,
            severity: entry.and_then(severity).or_else(|| {
                translation
                    .and_then(|t| t.attr("displayName"))
                    .map(str::to_string)
            }),
        });
    }

    diagnoses
}
