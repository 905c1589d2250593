//! Error handling for the ingestion pipeline.
//!
//! Errors carry a scope: some only invalidate the document being processed,
//! others end the whole run. See [`IngestError::is_fatal`].

use std::io;
use std::path::PathBuf;

use sqlx::error::ErrorKind;

/// Specialized error type for document ingestion
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Error opening, reading or listing a file or directory
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not well-formed XML
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The document is well-formed but not a clinical document we understand
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// The document has no identifiable patient
    #[error("Document does not identify a patient")]
    MissingPatient,

    /// The relational store could not be reached
    #[error("Could not connect to database: {0}")]
    Connection(#[source] sqlx::Error),

    /// Error talking to the relational store
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error moving a persisted file into the processed location
    #[error("Failed to archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IngestError {
    /// Wrap an IO error with the path it occurred on
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed document error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedDocument(msg.into())
    }

    /// Whether this error must stop the current run.
    ///
    /// Input problems and rows rejected by a table constraint only affect the
    /// file being processed; that file stays in the incoming location. Any
    /// other database error means the store itself is unusable (missing
    /// tables, privileges, lost connection) and is fatal, as are filesystem
    /// failures and configuration problems.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Xml(_) | Self::MalformedDocument(_) | Self::MissingPatient => false,
            Self::Database(sqlx::Error::Database(db)) => !matches!(
                db.kind(),
                ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation
            ),
            Self::Connection(_)
            | Self::Database(_)
            | Self::Io { .. }
            | Self::Config(_)
            | Self::Archive { .. } => true,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for IngestError {
    fn from(error: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(quick_xml::Error::from(error))
    }
}

impl From<quick_xml::escape::EscapeError> for IngestError {
    fn from(error: quick_xml::escape::EscapeError) -> Self {
        Self::Xml(quick_xml::Error::from(error))
    }
}

/// Result type for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;
