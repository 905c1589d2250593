//! The ingestion worker: parse, persist, archive
//!
//! Documents are handled strictly one after another. For each document the
//! order is read → parse → persist (one transaction) → move. A document is
//! moved only once its transaction has committed, so a failure at any earlier
//! step leaves it in the incoming location.

use std::path::Path;
use std::time::Instant;

use crate::ccda::load_patient_record;
use crate::config::IngestConfig;
use crate::error::Result;
use crate::pipeline::archive::archive_file;
use crate::pipeline::report::{IngestReport, ProcessedFile};
use crate::pipeline::scan::scan_incoming;
use crate::store::PatientStore;
use crate::utils::logging::{
    create_file_progress_bar, finish_and_clear, log_operation_complete, log_operation_start,
    log_warning,
};

/// Processes every document in the incoming location
pub struct IngestWorker {
    config: IngestConfig,
    store: Option<PatientStore>,
}

impl IngestWorker {
    /// Create a worker, connecting to the store unless this is a dry run
    pub async fn connect(config: IngestConfig) -> Result<Self> {
        let store = if config.dry_run {
            None
        } else {
            Some(PatientStore::connect(&config.database).await?)
        };
        Ok(Self { config, store })
    }

    /// Create a worker on an existing store connection
    #[must_use]
    pub fn with_store(config: IngestConfig, store: PatientStore) -> Self {
        let store = (!config.dry_run).then_some(store);
        Self { config, store }
    }

    /// Ingest every document currently waiting.
    ///
    /// Documents that cannot be parsed, or whose records break a table
    /// constraint, are skipped and listed in the report. A fatal error stops the
    /// run and is returned; documents already archived stay archived.
    pub async fn run(&self) -> Result<IngestReport> {
        let incoming = &self.config.incoming_dir;
        let mut report = IngestReport::new(self.store.is_none());

        let documents = scan_incoming(incoming)?;
        if documents.is_empty() {
            log::info!("No documents waiting in {}", incoming.display());
            return Ok(report);
        }

        if let Some(store) = &self.store {
            store.ensure_tables().await?;
        }

        log_operation_start("Ingesting documents from", incoming);
        let start = Instant::now();
        let progress = self
            .config
            .show_progress
            .then(|| create_file_progress_bar(documents.len() as u64, Some("documents")));

        for path in documents {
            log::info!("Processing file: {}", path.display());

            match self.ingest_file(&path).await {
                Ok(processed) => report.record_processed(processed),
                Err(e) if !e.is_fatal() => {
                    log_warning(&format!("Skipping document ({e})"), Some(path.as_path()));
                    report.record_skipped(path, e.to_string());
                }
                Err(e) => {
                    if let Some(pb) = &progress {
                        finish_and_clear(pb);
                    }
                    log::error!(
                        "Stopping run at {} after {} document(s): {e}",
                        path.display(),
                        report.processed.len()
                    );
                    return Err(e);
                }
            }

            if let Some(pb) = &progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = &progress {
            finish_and_clear(pb);
        }

        let verb = if report.dry_run { "parsed" } else { "ingested" };
        log_operation_complete(
            verb,
            incoming,
            report.processed.len(),
            report.skipped.len(),
            start.elapsed(),
        );

        if let Some(store) = &self.store {
            let totals = store.row_counts().await?;
            log::info!(
                "Store now holds {} patient(s), {} hospitalization(s), {} diagnosis(es), {} medication(s)",
                totals.demographics,
                totals.hospitalizations,
                totals.diagnoses,
                totals.medications
            );
        }
        Ok(report)
    }

    /// Ingest a single document
    pub async fn ingest_file(&self, path: &Path) -> Result<ProcessedFile> {
        let record = load_patient_record(path)?;
        let patient_id = record.patient_id().to_string();

        let Some(store) = &self.store else {
            log::info!(
                "Parsed patient {patient_id}: {} hospitalization(s), {} diagnosis(es), {} medication(s)",
                record.hospitalizations().len(),
                record.diagnoses().len(),
                record.medications().len()
            );
            return Ok(ProcessedFile {
                source: path.to_path_buf(),
                archived_to: None,
                patient_id,
                rows: record.row_counts(),
            });
        };

        let rows = store.persist(&record).await?;
        log::info!(
            "Stored patient {patient_id} ({}): {} row(s)",
            record
                .demographics()
                .full_name()
                .unwrap_or_else(|| "name unknown".to_string()),
            rows.total()
        );

        let archived_to = archive_file(path, &self.config.processed_dir).inspect_err(|_| {
            log::error!("Patient {patient_id} is stored but {} could not be moved", path.display());
        })?;
        log::debug!("Moved {} to {}", path.display(), archived_to.display());

        Ok(ProcessedFile {
            source: path.to_path_buf(),
            archived_to: Some(archived_to),
            patient_id,
            rows,
        })
    }
}
