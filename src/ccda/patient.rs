//! Patient demographics from the document header (`recordTarget/patientRole`)

use crate::ccda::dates::parse_hl7_date;
use crate::ccda::document::XmlElement;
use crate::error::{IngestError, Result};
use crate::models::{Demographics, Gender};

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Display name of a coded value, preferring its first translation
fn coded_display(patient: &XmlElement, code_element: &str) -> Option<String> {
    let code = patient.child(code_element)?;
    let translated = code
        .child("translation")
        .and_then(|translation| translation.attr("displayName"));
    non_empty(translated.or_else(|| code.attr("displayName")))
}

fn parse_gender(patient: &XmlElement) -> Gender {
    let Some(code) = patient.child("administrativeGenderCode") else {
        return Gender::Unknown;
    };

    let from_code = code.attr("code").map(Gender::from);
    match from_code {
        Some(gender) if gender != Gender::Unknown => gender,
        _ => code
            .child("translation")
            .and_then(|translation| {
                translation
                    .attr("code")
                    .or_else(|| translation.attr("displayName"))
            })
            .map_or(Gender::Unknown, Gender::from),
    }
}

fn is_placeholder(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("none") || value.eq_ignore_ascii_case("null")
}

fn apply_telecoms(role: &XmlElement, demographics: &mut Demographics) {
    for telecom in role.children_named("telecom") {
        let Some(raw) = telecom.attr("value").map(str::trim) else {
            continue;
        };
        let is_email = raw.starts_with("mailto:");
        let value = raw.trim_start_matches("mailto:").trim_start_matches("tel:").trim();
        if is_placeholder(value) {
            continue;
        }

        let usage = telecom.attr("use").unwrap_or_default().to_ascii_uppercase();
        let uses: Vec<&str> = usage.split_whitespace().collect();

        let slot = if is_email {
            &mut demographics.email
        } else if uses.contains(&"MC") {
            &mut demographics.mobile_phone
        } else if uses.contains(&"HP") || uses.contains(&"H") {
            &mut demographics.home_phone
        } else {
            continue;
        };

        if slot.is_none() {
            *slot = Some(value.to_string());
        }
    }
}

fn apply_address(role: &XmlElement, demographics: &mut Demographics) {
    let Some(addr) = role.child("addr") else {
        return;
    };

    let street: Vec<&str> = addr
        .children_named("streetAddressLine")
        .filter_map(XmlElement::text)
        .collect();
    if !street.is_empty() {
        demographics.street = Some(street.join(", "));
    }
    demographics.city = non_empty(addr.child("city").and_then(XmlElement::text));
    demographics.state = non_empty(addr.child("state").and_then(XmlElement::text));
    demographics.postal_code = non_empty(addr.child("postalCode").and_then(XmlElement::text));
}

/// Extract demographics for the document's patient.
///
/// The patient identifier is the first `patientRole/id` with an `extension`.
/// Without one the document cannot be correlated and is rejected.
pub fn parse_demographics(document: &XmlElement) -> Result<Demographics> {
    let role = document
        .find_path("recordTarget/patientRole")
        .ok_or(IngestError::MissingPatient)?;

    let patient_id = role
        .children_named("id")
        .find_map(|id| non_empty(id.attr("extension")))
        .ok_or(IngestError::MissingPatient)?;

    let mut demographics = Demographics::new(patient_id);

    if let Some(patient) = role.child("patient") {
        if let Some(name) = patient.child("name") {
            let given: Vec<&str> = name
                .children_named("given")
                .filter_map(XmlElement::text)
                .collect();
            if !given.is_empty() {
                demographics.first_name = Some(given.join(" "));
            }
            demographics.last_name = non_empty(name.child("family").and_then(XmlElement::text));
        }

        demographics.birth_date = patient
            .child("birthTime")
            .and_then(|birth| birth.attr("value"))
            .and_then(parse_hl7_date);
        demographics.gender = parse_gender(patient);
        demographics.race = coded_display(patient, "raceCode");
        demographics.ethnicity = coded_display(patient, "ethnicGroupCode");
        demographics.marital_status = coded_display(patient, "maritalStatusCode");

        let languages: Vec<&str> = patient
            .select("languageCommunication/languageCode")
            .into_iter()
            .filter_map(|code| code.attr("code"))
            .collect();
        if !languages.is_empty() {
            demographics.language = Some(languages.join(", "));
        }
    }

    apply_address(role, &mut demographics);
    apply_telecoms(role, &mut demographics);

    Ok(demographics)
}
