//! CSV report output
//!
//! Writes one row per inspected URL, in the order produced by the assembler.

use crate::report::record::UrlRecord;
use crate::report::traits::{OutputResult, ReportWriter};
use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Report columns, in output order
pub const COLUMNS: [&str; 11] = [
    "url",
    "indexing_state",
    "crawl_status",
    "mobile_usability",
    "indexing_problem",
    "lcp",
    "ttfb",
    "cls",
    "fcp",
    "inp",
    "performance_problems",
];

/// Trailing column present only when some row carries an error message
pub const ERROR_MESSAGE_COLUMN: &str = "error_message";

/// Writes the report as a timestamped CSV file in a directory
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    directory: PathBuf,
    file_prefix: String,
    timestamp: DateTime<Local>,
}

impl CsvReportWriter {
    pub fn new(directory: impl Into<PathBuf>, file_prefix: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            directory: directory.into(),
            file_prefix: file_prefix.into(),
            timestamp,
        }
    }

    /// Full path of the file this writer produces
    pub fn path(&self) -> PathBuf {
        self.directory
            .join(report_file_name(&self.file_prefix, &self.timestamp))
    }
}

impl ReportWriter for CsvReportWriter {
    fn write(&self, records: &[UrlRecord]) -> OutputResult<PathBuf> {
        fs::create_dir_all(&self.directory)?;
        let path = self.path();
        write_csv(&path, records)?;
        Ok(path)
    }
}

/// `<prefix>_<YYYYMMDD_HHMMSS>.csv`
pub fn report_file_name(prefix: &str, timestamp: &DateTime<Local>) -> String {
    format!("{}_{}.csv", prefix, timestamp.format("%Y%m%d_%H%M%S"))
}

/// Writes rendered CSV to a file
pub fn write_csv(path: &Path, records: &[UrlRecord]) -> OutputResult<()> {
    fs::write(path, render_csv(records))?;
    Ok(())
}

/// Renders records as CSV text with a header row
pub fn render_csv(records: &[UrlRecord]) -> String {
    let include_error = records
        .iter()
        .any(|r| r.indexing.error_message.is_some());

    let mut header: Vec<&str> = COLUMNS.to_vec();
    if include_error {
        header.push(ERROR_MESSAGE_COLUMN);
    }

    let mut out = String::new();
    push_line(&mut out, header.iter().map(|h| Cow::Borrowed(*h)));

    for record in records {
        push_line(
            &mut out,
            row(record, include_error).into_iter().map(Cow::Owned),
        );
    }

    out
}

fn row(record: &UrlRecord, include_error: bool) -> Vec<String> {
    let indexing = &record.indexing;
    let performance = &record.performance;

    let mut cells = vec![
        record.url.clone(),
        indexing.indexing_state.to_string(),
        indexing.crawl_status.to_string(),
        indexing.mobile_usability.to_string(),
        record.indexing_problem().to_string(),
        performance.lcp.to_string(),
        performance.ttfb.to_string(),
        performance.cls.to_string(),
        performance.fcp.to_string(),
        performance.inp.to_string(),
        performance.problems.to_string(),
    ];

    if include_error {
        cells.push(indexing.error_message.clone().unwrap_or_default());
    }

    cells
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = Cow<'a, str>>) {
    let line: Vec<String> = cells.map(|c| escape(&c).into_owned()).collect();
    out.push_str(&line.join(","));
    out.push('\n');
}

/// Quotes a cell containing a delimiter, quote, or line break (RFC 4180)
fn escape(cell: &str) -> Cow<'_, str> {
    if cell.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", cell.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(cell)
    }
}
