//! Discovery of documents waiting in the incoming location

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Extension of ingestible documents, compared case-insensitively
pub const DOCUMENT_EXTENSION: &str = "xml";

fn is_document(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

/// List documents in `dir`, sorted by file name.
///
/// Subdirectories and files with other extensions are ignored. A missing or
/// unreadable directory is an error.
pub fn scan_incoming(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| IngestError::io(dir, e))?;

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| IngestError::io(dir, e))?.path();
        if is_document(&path) {
            documents.push(path);
        }
    }

    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}
