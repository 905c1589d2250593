//! The ingestion pipeline: scan the incoming location, ingest each document,
//! archive it into the processed location

pub mod archive;
pub mod report;
pub mod scan;
pub mod worker;

pub use archive::archive_file;
pub use report::{IngestReport, ProcessedFile, SkippedFile};
pub use scan::scan_incoming;
pub use worker::IngestWorker;
