//! Table layout of the relational store
//!
//! The same four tables are created on every backend; only the
//! auto-increment key and the gender column type differ.

use crate::error::{IngestError, Result};

pub const DEMOGRAPHICS_TABLE: &str = "patient_demographics";
pub const HOSPITALIZATIONS_TABLE: &str = "patient_hospitalizations";
pub const DIAGNOSES_TABLE: &str = "patient_diagnoses";
pub const MEDICATIONS_TABLE: &str = "patient_medications";

/// All destination tables, parents first
pub const TABLES: [&str; 4] = [
    DEMOGRAPHICS_TABLE,
    HOSPITALIZATIONS_TABLE,
    DIAGNOSES_TABLE,
    MEDICATIONS_TABLE,
];

/// Tables keyed by a patient's demographics row
pub const CHILD_TABLES: [&str; 3] = [HOSPITALIZATIONS_TABLE, DIAGNOSES_TABLE, MEDICATIONS_TABLE];

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    MySql,
    Sqlite,
}

impl Backend {
    /// Detect the backend from a connection URL scheme
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url
            .split_once(':')
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .unwrap_or_default();

        match scheme.as_str() {
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(IngestError::Config(format!(
                "unsupported database URL scheme '{scheme}', expected mysql or sqlite"
            ))),
        }
    }

    fn auto_increment_key(self, column: &str) -> String {
        match self {
            Self::MySql => format!("{column} INT AUTO_INCREMENT PRIMARY KEY"),
            Self::Sqlite => format!("{column} INTEGER PRIMARY KEY AUTOINCREMENT"),
        }
    }

    fn gender_column(self) -> &'static str {
        match self {
            Self::MySql => "gender ENUM('Male', 'Female', 'Other', 'Unknown')",
            Self::Sqlite => "gender TEXT CHECK (gender IN ('Male', 'Female', 'Other', 'Unknown'))",
        }
    }

    /// `CREATE TABLE IF NOT EXISTS` statements, in creation order
    #[must_use]
    pub fn create_table_statements(self) -> Vec<String> {
        vec![
            format!(
                "CREATE TABLE IF NOT EXISTS {DEMOGRAPHICS_TABLE} (
                    patient_id VARCHAR(50) PRIMARY KEY,
                    first_name VARCHAR(100),
                    last_name VARCHAR(100),
                    dob DATE,
                    {gender},
                    race VARCHAR(50),
                    ethnicity VARCHAR(50),
                    marital_status VARCHAR(50),
                    street VARCHAR(255),
                    city VARCHAR(100),
                    state VARCHAR(50),
                    postal_code VARCHAR(20),
                    home_phone VARCHAR(20),
                    mobile_phone VARCHAR(20),
                    email VARCHAR(100),
                    language VARCHAR(255)
                )",
                gender = self.gender_column()
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {HOSPITALIZATIONS_TABLE} (
                    hospitalization_id VARCHAR(50) PRIMARY KEY,
                    patient_id VARCHAR(50) NOT NULL,
                    admission_date DATETIME,
                    discharge_date DATETIME,
                    hospital_name VARCHAR(255),
                    service_details TEXT,
                    FOREIGN KEY (patient_id) REFERENCES {DEMOGRAPHICS_TABLE}(patient_id) ON DELETE CASCADE
                )"
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {DIAGNOSES_TABLE} (
                    {key},
                    patient_id VARCHAR(50) NOT NULL,
                    diagnosis_date VARCHAR(64),
                    icd10_code VARCHAR(20),
                    diagnosis_description TEXT,
                    severity VARCHAR(255),
                    FOREIGN KEY (patient_id) REFERENCES {DEMOGRAPHICS_TABLE}(patient_id) ON DELETE CASCADE
                )",
                key = self.auto_increment_key("diagnosis_id")
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {MEDICATIONS_TABLE} (
                    {key},
                    patient_id VARCHAR(50) NOT NULL,
                    medication_code VARCHAR(50),
                    medication_name VARCHAR(255) NOT NULL,
                    dosage VARCHAR(50),
                    frequency VARCHAR(50),
                    start_date DATETIME,
                    end_date DATETIME,
                    instructions TEXT,
                    FOREIGN KEY (patient_id) REFERENCES {DEMOGRAPHICS_TABLE}(patient_id) ON DELETE CASCADE
                )",
                key = self.auto_increment_key("medication_id")
            ),
        ]
    }
}

/// Check that a database name is safe to splice into `CREATE DATABASE`
pub fn validate_database_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');

    if valid {
        Ok(())
    } else {
        Err(IngestError::Config(format!("invalid database name '{name}'")))
    }
}
