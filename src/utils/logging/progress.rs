//! Progress reporting for ingestion runs, using the indicatif crate

use indicatif::{ProgressBar, ProgressStyle};

/// Style of the per-file progress bar
pub const FILE_PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}";

/// Create a progress bar counting documents
///
/// # Arguments
/// * `length` - Number of documents in the run
/// * `description` - Optional message shown next to the bar
///
/// # Returns
/// A styled `ProgressBar`, drawn on stderr
#[must_use]
pub fn create_file_progress_bar(length: u64, description: Option<&str>) -> ProgressBar {
    let pb = ProgressBar::new(length);
    let style = ProgressStyle::default_bar()
        .template(FILE_PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);

    if let Some(desc) = description {
        pb.set_message(desc.to_string());
    }

    pb
}

/// Finish a progress bar and clear it from display
///
/// # Arguments
/// * `pb` - The progress bar to finish
pub fn finish_and_clear(pb: &ProgressBar) {
    pb.finish_and_clear();
}
