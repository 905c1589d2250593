//! Medications from the medications section (LOINC 10160-0)

use chrono::NaiveDateTime;

use crate::ccda::dates::parse_hl7_timestamp;
use crate::ccda::document::XmlElement;
use crate::models::Medication;
use crate::models::medication::{NO_INSTRUCTIONS, UNKNOWN_MEDICATION};

/// LOINC code identifying the medications section
pub const MEDICATIONS_SECTION_CODE: &str = "10160-0";

fn medications_section(document: &XmlElement) -> Option<&XmlElement> {
    document.find_all("section").find(|section| {
        section
            .child("code")
            .is_some_and(|code| code.attr("code") == Some(MEDICATIONS_SECTION_CODE))
    })
}

/// "value unit" of a physical quantity
fn quantity(element: Option<&XmlElement>) -> Option<String> {
    let element = element?;
    let parts: Vec<&str> = [element.attr("value"), element.attr("unit")]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn boundary(substance: &XmlElement, edge: &str) -> Option<NaiveDateTime> {
    substance
        .find_path(&format!("effectiveTime/{edge}"))
        .and_then(|element| element.attr("value"))
        .and_then(parse_hl7_timestamp)
}

/// Upper-case the first character and lower-case the rest
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Extract one medication per entry holding a `substanceAdministration`
#[must_use]
pub fn parse_medications(document: &XmlElement, patient_id: &str) -> Vec<Medication> {
    let Some(section) = medications_section(document) else {
        return Vec::new();
    };

    section
        .find_all("entry")
        .filter_map(|entry| {
            let substance = entry.find("substanceAdministration")?;
            let material = substance.find_path("manufacturedMaterial/code");

            Some(Medication {
                patient_id: patient_id.to_string(),
                medication_code: material
                    .and_then(|code| code.attr("code"))
                    .map(str::to_string),
                medication_name: material
                    .and_then(|code| code.attr("displayName"))
                    .unwrap_or(UNKNOWN_MEDICATION)
                    .to_string(),
                dosage: quantity(substance.find("doseQuantity")),
                frequency: quantity(substance.find("rateQuantity")),
                start_date: boundary(substance, "low"),
                end_date: boundary(substance, "high"),
                instructions: entry
                    .find_path("entryRelationship/act/text")
                    .and_then(XmlElement::all_text)
                    .map_or_else(|| NO_INSTRUCTIONS.to_string(), |text| capitalize(&text)),
            })
        })
        .collect()
}
