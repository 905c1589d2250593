//! Hospitalizations from `encounter` entries

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::ccda::dates::parse_hl7_timestamp;
use crate::ccda::document::XmlElement;
use crate::models::Hospitalization;

/// Read a TS boundary (`low`/`high`), preferring the `value` attribute
fn boundary(effective_time: Option<&XmlElement>, edge: &str) -> Option<NaiveDateTime> {
    let edge = effective_time?.child(edge)?;
    edge.attr("value")
        .or_else(|| edge.text())
        .and_then(parse_hl7_timestamp)
}

fn service_details(encounter: &XmlElement) -> Option<String> {
    let code = encounter.child("code")?;
    code.attr("displayName")
        .map(str::to_string)
        .or_else(|| code.child("originalText").and_then(XmlElement::all_text))
}

/// Extract one hospitalization per distinct encounter.
///
/// Encounters without an identifier (`id/@extension`) cannot be keyed and are
/// skipped. An encounter repeated elsewhere in the document (e.g. referenced
/// again from another section) is kept once, at its first occurrence.
#[must_use]
pub fn parse_hospitalizations(document: &XmlElement, patient_id: &str) -> Vec<Hospitalization> {
    let mut seen = HashSet::new();

    document
        .find_all("encounter")
        .filter_map(|encounter| {
            let Some(hospitalization_id) = encounter
                .children_named("id")
                .find_map(|id| id.attr("extension"))
                .map(str::trim)
                .filter(|id| !id.is_empty())
            else {
                log::debug!("Skipping encounter without identifier");
                return None;
            };

            if !seen.insert(hospitalization_id) {
                log::debug!("Skipping repeated encounter {hospitalization_id}");
                return None;
            }

            let effective_time = encounter.child("effectiveTime");

            Some(Hospitalization {
                patient_id: patient_id.to_string(),
                hospitalization_id: hospitalization_id.to_string(),
                admission_date: boundary(effective_time, "low"),
                discharge_date: boundary(effective_time, "high"),
                hospital_name: encounter.find("name").and_then(XmlElement::all_text),
                service_details: service_details(encounter),
            })
        })
        .collect()
}
