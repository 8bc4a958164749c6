use crate::report::record::UrlRecord;

/// A record with its scoring columns, used only while ordering the report
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: UrlRecord,
    pub priority: u8,
    pub num_performance_issues: usize,
}

impl ScoredRecord {
    pub fn new(record: UrlRecord) -> Self {
        Self {
            priority: priority(&record),
            num_performance_issues: record.performance.problems.count(),
            record,
        }
    }
}

/// Priority score of a record, from 0 to 3
///
/// An indexing problem contributes 2 and a non-empty breach list contributes 1,
/// and the two add up. `None`, `No CrUX data` and `ERROR` add nothing.
pub fn priority(record: &UrlRecord) -> u8 {
    let indexing = if record.indexing_problem() { 2 } else { 0 };
    let performance = if record.performance.problems.has_breaches() {
        1
    } else {
        0
    };
    indexing + performance
}

/// Scores and orders records worst-first
///
/// Sorting is descending on `(priority, indexing_problem,
/// num_performance_issues)` and stable, so records with equal keys keep the
/// order they were inspected in. The scoring columns are dropped afterwards.
pub fn assemble(records: Vec<UrlRecord>) -> Vec<UrlRecord> {
    let mut scored: Vec<ScoredRecord> = records.into_iter().map(ScoredRecord::new).collect();

    scored.sort_by(|a, b| {
        let key_a = (a.priority, a.record.indexing_problem(), a.num_performance_issues);
        let key_b = (b.priority, b.record.indexing_problem(), b.num_performance_issues);
        key_b.cmp(&key_a)
    });

    scored.into_iter().map(|s| s.record).collect()
}
