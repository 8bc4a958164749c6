//! Run summary
//!
//! Counts the problems found in a finished report and prints them the way the
//! CLI shows end-of-run statistics.

use crate::report::record::{IndexingState, PerformanceProblems, UrlRecord};

/// Problem counts for one audit run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total_urls: usize,
    pub indexing_problems: usize,
    /// Rows whose inspection call failed (a subset of `indexing_problems`)
    pub inspection_errors: usize,
    pub performance_problems: usize,
    pub no_crux_data: usize,
    pub metrics_errors: usize,
    /// Rows with neither an indexing problem nor a performance breach
    pub healthy: usize,
}

impl ReportSummary {
    pub fn from_records(records: &[UrlRecord]) -> Self {
        let mut summary = Self {
            total_urls: records.len(),
            ..Self::default()
        };

        for record in records {
            if record.indexing_problem() {
                summary.indexing_problems += 1;
            }
            if matches!(record.indexing.indexing_state, IndexingState::Error(_)) {
                summary.inspection_errors += 1;
            }
            match &record.performance.problems {
                problems if problems.has_breaches() => summary.performance_problems += 1,
                PerformanceProblems::NoCruxData => summary.no_crux_data += 1,
                PerformanceProblems::Error => summary.metrics_errors += 1,
                _ => {}
            }
            if !record.indexing_problem() && !record.performance.problems.has_breaches() {
                summary.healthy += 1;
            }
        }

        summary
    }
}

/// Prints the summary to stdout
pub fn print_summary(summary: &ReportSummary) {
    println!("=== Audit Summary ===\n");

    println!("  URLs inspected: {}", summary.total_urls);
    println!(
        "  Indexing problems: {} ({:.1}%)",
        summary.indexing_problems,
        percentage(summary.indexing_problems, summary.total_urls)
    );
    println!("    of which inspection errors: {}", summary.inspection_errors);
    println!(
        "  Performance problems: {} ({:.1}%)",
        summary.performance_problems,
        percentage(summary.performance_problems, summary.total_urls)
    );
    println!("  No CrUX data: {}", summary.no_crux_data);
    println!("  CrUX errors: {}", summary.metrics_errors);
    println!("  Healthy: {}", summary.healthy);
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (count as f64 / total as f64) * 100.0
    }
}
