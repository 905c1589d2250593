//! Core types shared by the patient record models

use serde::Serialize;

/// Administrative gender, as stored in `patient_demographics.gender`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Gender {
    /// Male gender
    Male,
    /// Female gender
    Female,
    /// Other gender
    Other,
    /// Unknown or not specified
    #[default]
    Unknown,
}

impl Gender {
    /// Column value for this gender
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
            Self::Other => "Other",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<&str> for Gender {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Self::Male,
            "f" | "female" => Self::Female,
            "o" | "other" | "un" | "undifferentiated" => Self::Other,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Number of rows written per destination table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowCounts {
    pub demographics: usize,
    pub hospitalizations: usize,
    pub diagnoses: usize,
    pub medications: usize,
}

impl RowCounts {
    /// Total rows across all four tables
    #[must_use]
    pub const fn total(&self) -> usize {
        self.demographics + self.hospitalizations + self.diagnoses + self.medications
    }
}

impl std::ops::AddAssign for RowCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.demographics += rhs.demographics;
        self.hospitalizations += rhs.hospitalizations;
        self.diagnoses += rhs.diagnoses;
        self.medications += rhs.medications;
    }
}
