//! Core Web Vitals thresholds
//!
//! | Metric | CrUX name | Breach when p75 > |
//! |--------|-----------|-------------------|
//! | LCP | largest_contentful_paint | 2500 ms |
//! | TTFB | experimental_time_to_first_byte | 800 ms |
//! | CLS | cumulative_layout_shift | 0.1 |
//! | FCP | first_contentful_paint | 1800 ms |
//! | INP | interaction_to_next_paint | 200 ms |

use crate::report::{format_number, MetricValue, PerformanceFields};

/// A tracked performance metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Lcp,
    Ttfb,
    Cls,
    Fcp,
    Inp,
}

impl Metric {
    /// All metrics in report column order
    pub const ALL: [Metric; 5] = [Self::Lcp, Self::Ttfb, Self::Cls, Self::Fcp, Self::Inp];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Lcp => "LCP",
            Self::Ttfb => "TTFB",
            Self::Cls => "CLS",
            Self::Fcp => "FCP",
            Self::Inp => "INP",
        }
    }

    /// Key of the metric in a CrUX record
    pub fn crux_name(&self) -> &'static str {
        match self {
            Self::Lcp => "largest_contentful_paint",
            Self::Ttfb => "experimental_time_to_first_byte",
            Self::Cls => "cumulative_layout_shift",
            Self::Fcp => "first_contentful_paint",
            Self::Inp => "interaction_to_next_paint",
        }
    }

    pub fn threshold(&self) -> f64 {
        match self {
            Self::Lcp => 2500.0,
            Self::Ttfb => 800.0,
            Self::Cls => 0.1,
            Self::Fcp => 1800.0,
            Self::Inp => 200.0,
        }
    }

    /// Unit appended to values in breach descriptions; CLS is unitless
    pub fn unit(&self) -> &'static str {
        match self {
            Self::Cls => "",
            _ => "ms",
        }
    }

    /// Reads this metric from a set of performance fields
    pub fn value_in(&self, fields: &PerformanceFields) -> MetricValue {
        match self {
            Self::Lcp => fields.lcp,
            Self::Ttfb => fields.ttfb,
            Self::Cls => fields.cls,
            Self::Fcp => fields.fcp,
            Self::Inp => fields.inp,
        }
    }

    /// Describes a breach such as `LCP: 3000ms`
    ///
    /// Only measured values are compared; sentinels never breach.
    pub fn breach(&self, value: MetricValue) -> Option<String> {
        let measured = value.value()?;
        if measured > self.threshold() {
            Some(format!(
                "{}: {}{}",
                self.label(),
                format_number(measured),
                self.unit()
            ))
        } else {
            None
        }
    }
}

/// Lists every breached metric in column order
pub fn find_breaches(fields: &PerformanceFields) -> Vec<String> {
    Metric::ALL
        .iter()
        .filter_map(|metric| metric.breach(metric.value_in(fields)))
        .collect()
}
