//! Patient demographics model

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::types::Gender;

/// One patient's identifying and biographic data
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Demographics {
    /// Patient identifier correlating all records of the patient
    pub patient_id: String,
    /// Given names, space separated
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Gender,
    pub race: Option<String>,
    pub ethnicity: Option<String>,
    pub marital_status: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub home_phone: Option<String>,
    pub mobile_phone: Option<String>,
    pub email: Option<String>,
    /// Language codes, comma separated
    pub language: Option<String>,
}

impl Demographics {
    /// Create demographics carrying only the patient identifier
    #[must_use]
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            ..Self::default()
        }
    }

    /// Full name as "first last", if any part is known
    #[must_use]
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}
