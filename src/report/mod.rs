//! Report module for assembling and writing audit results
//!
//! This module handles:
//! - The per-URL record types and their sentinel values
//! - Priority scoring and worst-first ordering
//! - Writing the CSV report
//! - Summarizing a finished run

mod assembler;
mod csv;
mod record;
pub mod summary;
mod traits;

pub use assembler::{assemble, priority, ScoredRecord};
pub use csv::{render_csv, report_file_name, CsvReportWriter, COLUMNS, ERROR_MESSAGE_COLUMN};
pub use record::{
    format_number, Field, IndexingFields, IndexingState, MetricValue, PerformanceFields,
    PerformanceProblems, UrlRecord, Verdict, BREACH_SEPARATOR,
};
pub use summary::{print_summary, ReportSummary};
pub use traits::{OutputError, OutputResult, ReportWriter};
