/// Per-URL record types
///
/// Every field that the upstream services may leave empty or fail to deliver is
/// a tagged enum, so a sentinel can never be mistaken for a measurement.
use serde::Deserialize;
use std::fmt;

/// Rendering of a value the service did not report
pub const NOT_AVAILABLE: &str = "N/A";

/// Rendering of a value lost to a failed call
pub const ERROR: &str = "ERROR";

/// A reported value, or the reason there is none
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Value(T),
    NotAvailable,
    Error,
}

impl<T> Field<T> {
    /// Wraps an optional response value, mapping absence to `NotAvailable`
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Value(v),
            None => Self::NotAvailable,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", v),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
            Self::Error => f.write_str(ERROR),
        }
    }
}

/// The search engine's classification of a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexingState {
    /// The page is in the index
    Indexed,

    /// Any other reported state (e.g. `DISCOVERED_NOT_INDEXED`)
    Other(String),

    /// The service returned no state
    NotAvailable,

    /// The inspection call failed, with its HTTP status when there was one
    Error(Option<u16>),
}

impl IndexingState {
    /// Maps the raw state string from the inspection response
    pub fn from_reported(state: Option<&str>) -> Self {
        match state {
            Some("INDEXED") => Self::Indexed,
            Some(NOT_AVAILABLE) => Self::NotAvailable,
            Some(other) => Self::Other(other.to_string()),
            None => Self::NotAvailable,
        }
    }

    /// True for every state except `INDEXED` and `N/A`
    pub fn is_problem(&self) -> bool {
        !matches!(self, Self::Indexed | Self::NotAvailable)
    }
}

impl fmt::Display for IndexingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indexed => f.write_str("INDEXED"),
            Self::Other(state) => f.write_str(state),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
            Self::Error(Some(code)) => write!(f, "{}: {}", ERROR, code),
            Self::Error(None) => f.write_str(ERROR),
        }
    }
}

/// Mobile usability verdict
///
/// Verdicts this crate does not know are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Verdict {
    Pass,
    Partial,
    Fail,
    Neutral,
    VerdictUnspecified,
    Other(String),
}

impl Verdict {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pass => "PASS",
            Self::Partial => "PARTIAL",
            Self::Fail => "FAIL",
            Self::Neutral => "NEUTRAL",
            Self::VerdictUnspecified => "VERDICT_UNSPECIFIED",
            Self::Other(verdict) => verdict,
        }
    }
}

impl From<String> for Verdict {
    fn from(verdict: String) -> Self {
        match verdict.as_str() {
            "PASS" => Self::Pass,
            "PARTIAL" => Self::Partial,
            "FAIL" => Self::Fail,
            "NEUTRAL" => Self::Neutral,
            "VERDICT_UNSPECIFIED" => Self::VerdictUnspecified,
            _ => Self::Other(verdict),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A p75 performance metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricValue {
    Value(f64),
    /// The response had no such metric
    NotAvailable,
    /// The metrics service holds no data for the URL
    NoData,
    Error,
}

impl MetricValue {
    /// Returns the measurement, if there is one
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.write_str(&format_number(*v)),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE),
            Self::NoData => f.write_str("NO_DATA"),
            Self::Error => f.write_str(ERROR),
        }
    }
}

/// Formats whole numbers without a fractional part (`3000`, not `3000.0`)
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Threshold breaches found for a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PerformanceProblems {
    /// Breach descriptions such as `LCP: 3000ms`; empty when every metric is within bounds
    Breaches(Vec<String>),
    /// The metrics service has no data for the URL
    NoCruxData,
    Error,
}

/// Separator between breach descriptions in the report
pub const BREACH_SEPARATOR: &str = "; ";

impl PerformanceProblems {
    /// Number of breached metrics; zero for sentinels
    pub fn count(&self) -> usize {
        match self {
            Self::Breaches(breaches) => breaches.len(),
            _ => 0,
        }
    }

    /// True only for a non-empty breach list
    pub fn has_breaches(&self) -> bool {
        self.count() > 0
    }
}

impl fmt::Display for PerformanceProblems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Breaches(breaches) if breaches.is_empty() => f.write_str("None"),
            Self::Breaches(breaches) => f.write_str(&breaches.join(BREACH_SEPARATOR)),
            Self::NoCruxData => f.write_str("No CrUX data"),
            Self::Error => f.write_str(ERROR),
        }
    }
}

/// Indexing half of a URL record
#[derive(Debug, Clone, PartialEq)]
pub struct IndexingFields {
    pub indexing_state: IndexingState,
    /// Last crawl timestamp as reported
    pub crawl_status: Field<String>,
    pub mobile_usability: Field<Verdict>,
    pub error_message: Option<String>,
}

impl IndexingFields {
    pub fn indexing_problem(&self) -> bool {
        self.indexing_state.is_problem()
    }
}

/// Performance half of a URL record
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceFields {
    pub lcp: MetricValue,
    pub ttfb: MetricValue,
    pub cls: MetricValue,
    pub fcp: MetricValue,
    pub inp: MetricValue,
    pub problems: PerformanceProblems,
}

impl PerformanceFields {
    /// Every metric set to `NO_DATA`
    pub fn no_data() -> Self {
        Self::filled(MetricValue::NoData, PerformanceProblems::NoCruxData)
    }

    /// Every metric set to `ERROR`
    pub fn error() -> Self {
        Self::filled(MetricValue::Error, PerformanceProblems::Error)
    }

    fn filled(value: MetricValue, problems: PerformanceProblems) -> Self {
        Self {
            lcp: value,
            ttfb: value,
            cls: value,
            fcp: value,
            inp: value,
            problems,
        }
    }
}

/// One inspected page
#[derive(Debug, Clone, PartialEq)]
pub struct UrlRecord {
    pub url: String,
    pub indexing: IndexingFields,
    pub performance: PerformanceFields,
}

impl UrlRecord {
    pub fn new(url: impl Into<String>, indexing: IndexingFields, performance: PerformanceFields) -> Self {
        Self {
            url: url.into(),
            indexing,
            performance,
        }
    }

    pub fn indexing_problem(&self) -> bool {
        self.indexing.indexing_problem()
    }
}
