//! Relocation of ingested documents into the processed location

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{IngestError, Result};

fn archive_error(path: &Path, source: std::io::Error) -> IngestError {
    IngestError::Archive {
        path: path.to_path_buf(),
        source,
    }
}

/// A destination in `processed_dir` that does not exist yet
fn free_destination(source: &Path, processed_dir: &Path) -> Result<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| {
        archive_error(
            source,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;

    let destination = processed_dir.join(file_name);
    if !destination.exists() {
        return Ok(destination);
    }

    let stem = source
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let stamp = Utc::now().format("%Y%m%dT%H%M%S%3f");

    let mut attempt = 0u32;
    loop {
        let candidate = if attempt == 0 {
            processed_dir.join(format!("{stem}-{stamp}{extension}"))
        } else {
            processed_dir.join(format!("{stem}-{stamp}-{attempt}{extension}"))
        };
        if !candidate.exists() {
            return Ok(candidate);
        }
        attempt += 1;
    }
}

/// Move `source` into `processed_dir`, returning its new path.
///
/// An archived document is never overwritten: when the name is taken, a UTC
/// timestamp is added to the new file's stem. Moves across filesystems fall
/// back to copy and delete.
pub fn archive_file(source: &Path, processed_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(processed_dir).map_err(|e| archive_error(processed_dir, e))?;
    let destination = free_destination(source, processed_dir)?;

    if let Err(rename_error) = fs::rename(source, &destination) {
        log::debug!(
            "Rename of {} failed ({rename_error}), copying instead",
            source.display()
        );
        fs::copy(source, &destination).map_err(|_| archive_error(source, rename_error))?;
        fs::remove_file(source).map_err(|e| archive_error(source, e))?;
    }

    Ok(destination)
}
