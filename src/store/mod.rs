//! Relational store for patient records
//!
//! Connections go through sqlx's `Any` driver so the same code path serves a
//! MySQL server in production and a SQLite file for local runs and tests.

pub mod schema;

use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::{AnyConnection, AnyPool, Connection};

use crate::ccda::dates::{DB_DATE_FORMAT, DB_TIMESTAMP_FORMAT};
use crate::config::DatabaseConfig;
use crate::error::{IngestError, Result};
use crate::models::{PatientRecord, RowCounts};

pub use schema::{Backend, CHILD_TABLES, TABLES};
use schema::{
    DEMOGRAPHICS_TABLE, DIAGNOSES_TABLE, HOSPITALIZATIONS_TABLE, MEDICATIONS_TABLE,
    validate_database_name,
};

/// Handle on the database holding the four patient tables
#[derive(Debug, Clone)]
pub struct PatientStore {
    pool: AnyPool,
    backend: Backend,
}

impl PatientStore {
    /// Connect to the configured database
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        install_default_drivers();

        let url = config.connection_url();
        let backend = Backend::from_url(&url)?;
        // Files are processed one at a time.
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .map_err(IngestError::Connection)?;

        log::debug!("Connected to {backend:?} store");
        Ok(Self { pool, backend })
    }

    /// Create the database (MySQL only) and the four tables if missing
    pub async fn setup(config: &DatabaseConfig) -> Result<Self> {
        install_default_drivers();

        if let Some(server_url) = config.server_url() {
            validate_database_name(&config.name)?;
            let mut connection = AnyConnection::connect(&server_url)
                .await
                .map_err(IngestError::Connection)?;
            let statement = format!("CREATE DATABASE IF NOT EXISTS `{}`", config.name);
            sqlx::query(&statement).execute(&mut connection).await?;
            connection.close().await?;
            log::info!("Database '{}' is ready", config.name);
        }

        let store = Self::connect(config).await?;
        store.create_tables().await?;
        Ok(store)
    }

    /// Create any missing tables
    pub async fn create_tables(&self) -> Result<()> {
        for (statement, table) in self.backend.create_table_statements().iter().zip(TABLES) {
            sqlx::query(statement).execute(&self.pool).await?;
            log::info!("Created table '{table}'");
        }
        Ok(())
    }

    /// Check that every table exists and is readable.
    ///
    /// A store that was never set up fails here with a configuration error
    /// instead of rejecting each document in turn.
    pub async fn ensure_tables(&self) -> Result<()> {
        for table in TABLES {
            let statement = format!("SELECT 1 FROM {table} LIMIT 1");
            sqlx::query(&statement)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| match e {
                    sqlx::Error::Database(db) => IngestError::Config(format!(
                        "table '{table}' is not usable ({}); run `setup` first",
                        db.message()
                    )),
                    other => IngestError::Database(other),
                })?;
        }
        Ok(())
    }

    /// Write all records of one document in a single transaction.
    ///
    /// The document is treated as the current snapshot of the patient: rows
    /// previously stored for the patient are replaced, so ingesting the same
    /// document twice leaves the tables unchanged. If any statement fails the
    /// transaction is rolled back and nothing from the document is kept.
    pub async fn persist(&self, record: &PatientRecord) -> Result<RowCounts> {
        let patient_id = record.patient_id();
        let mut tx = self.pool.begin().await?;

        for table in CHILD_TABLES.into_iter().chain([DEMOGRAPHICS_TABLE]) {
            let statement = format!("DELETE FROM {table} WHERE patient_id = ?");
            sqlx::query(&statement)
                .bind(patient_id)
                .execute(&mut *tx)
                .await?;
        }

        let d = record.demographics();
        sqlx::query(
            "INSERT INTO patient_demographics (patient_id, first_name, last_name, dob, gender, \
             race, ethnicity, marital_status, street, city, state, postal_code, home_phone, \
             mobile_phone, email, language) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(patient_id)
        .bind(d.first_name.as_deref())
        .bind(d.last_name.as_deref())
        .bind(d.birth_date.map(|date| date.format(DB_DATE_FORMAT).to_string()))
        .bind(d.gender.as_str())
        .bind(d.race.as_deref())
        .bind(d.ethnicity.as_deref())
        .bind(d.marital_status.as_deref())
        .bind(d.street.as_deref())
        .bind(d.city.as_deref())
        .bind(d.state.as_deref())
        .bind(d.postal_code.as_deref())
        .bind(d.home_phone.as_deref())
        .bind(d.mobile_phone.as_deref())
        .bind(d.email.as_deref())
        .bind(d.language.as_deref())
        .execute(&mut *tx)
        .await?;

        for h in record.hospitalizations() {
            sqlx::query(
                "INSERT INTO patient_hospitalizations (hospitalization_id, patient_id, \
                 admission_date, discharge_date, hospital_name, service_details) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(h.hospitalization_id.as_str())
            .bind(patient_id)
            .bind(h.admission_date.map(|ts| ts.format(DB_TIMESTAMP_FORMAT).to_string()))
            .bind(h.discharge_date.map(|ts| ts.format(DB_TIMESTAMP_FORMAT).to_string()))
            .bind(h.hospital_name.as_deref())
            .bind(h.service_details.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        for diagnosis in record.diagnoses() {
            sqlx::query(
                "INSERT INTO patient_diagnoses (patient_id, diagnosis_date, icd10_code, \
                 diagnosis_description, severity) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(patient_id)
            .bind(diagnosis.diagnosis_date.as_str())
            .bind(diagnosis.icd10_code.as_deref())
            .bind(diagnosis.description.as_str())
            .bind(diagnosis.severity.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        for m in record.medications() {
            sqlx::query(
                "INSERT INTO patient_medications (patient_id, medication_code, medication_name, \
                 dosage, frequency, start_date, end_date, instructions) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(patient_id)
            .bind(m.medication_code.as_deref())
            .bind(m.medication_name.as_str())
            .bind(m.dosage.as_deref())
            .bind(m.frequency.as_deref())
            .bind(m.start_date.map(|ts| ts.format(DB_TIMESTAMP_FORMAT).to_string()))
            .bind(m.end_date.map(|ts| ts.format(DB_TIMESTAMP_FORMAT).to_string()))
            .bind(m.instructions.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(record.row_counts())
    }

    fn checked_table(table: &str) -> Result<&str> {
        TABLES
            .into_iter()
            .find(|known| *known == table)
            .ok_or_else(|| IngestError::Config(format!("unknown table '{table}'")))
    }

    /// Number of rows a table holds for one patient
    pub async fn count_rows(&self, table: &str, patient_id: &str) -> Result<i64> {
        let statement = format!(
            "SELECT COUNT(*) FROM {} WHERE patient_id = ?",
            Self::checked_table(table)?
        );
        let count = sqlx::query_scalar::<_, i64>(&statement)
            .bind(patient_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Number of rows in a table
    pub async fn total_rows(&self, table: &str) -> Result<i64> {
        let statement = format!("SELECT COUNT(*) FROM {}", Self::checked_table(table)?);
        let count = sqlx::query_scalar::<_, i64>(&statement)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Per-table row totals
    pub async fn row_counts(&self) -> Result<RowCounts> {
        let count = |n: i64| usize::try_from(n).unwrap_or_default();
        Ok(RowCounts {
            demographics: count(self.total_rows(DEMOGRAPHICS_TABLE).await?),
            hospitalizations: count(self.total_rows(HOSPITALIZATIONS_TABLE).await?),
            diagnoses: count(self.total_rows(DIAGNOSES_TABLE).await?),
            medications: count(self.total_rows(MEDICATIONS_TABLE).await?),
        })
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
