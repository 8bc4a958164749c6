//! Report output traits and errors

use crate::report::record::UrlRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination of a finished report
///
/// Receives records already ordered by the assembler.
pub trait ReportWriter {
    /// Writes the report and returns where it was written
    fn write(&self, records: &[UrlRecord]) -> OutputResult<PathBuf>;
}
