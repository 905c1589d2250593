//! Standardized log lines for ingestion runs

use std::path::Path;
use std::time::Duration;

/// Log the start of an operation on a file or directory
///
/// # Arguments
/// * `operation` - Description of the operation, e.g. "Ingesting documents from"
/// * `path` - File or directory being operated on
pub fn log_operation_start(operation: &str, path: &Path) {
    log::info!("{operation} {}", path.display());
}

/// Log the end of a run over a directory
///
/// A run that left documents behind is logged as a warning.
///
/// # Arguments
/// * `operation` - Past-tense verb for the run, e.g. "ingested"
/// * `path` - Directory the documents were read from
/// * `processed` - Number of documents handled successfully
/// * `skipped` - Number of documents left in place
/// * `elapsed` - Duration of the run
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    processed: usize,
    skipped: usize,
    elapsed: Duration,
) {
    if skipped == 0 {
        log::info!(
            "Successfully {operation} {processed} document(s) from {} in {elapsed:?}",
            path.display()
        );
    } else {
        log::warn!(
            "{operation} {processed} document(s) from {} in {elapsed:?}; {skipped} left in place",
            path.display()
        );
    }
}

/// Log a warning, optionally tied to a path
///
/// # Arguments
/// * `message` - Warning text
/// * `path` - File the warning concerns, if any
pub fn log_warning(message: &str, path: Option<&Path>) {
    match path {
        Some(path) => log::warn!("{message}: {}", path.display()),
        None => log::warn!("{message}"),
    }
}
