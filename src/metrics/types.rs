use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of a CrUX record query
#[derive(Debug, Serialize)]
pub struct CruxQuery<'a> {
    pub url: &'a str,
}

/// Response of the CrUX `records:queryRecord` endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CruxResponse {
    #[serde(default)]
    pub record: Option<CruxRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CruxRecord {
    #[serde(default)]
    pub metrics: HashMap<String, CruxMetric>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CruxMetric {
    #[serde(default)]
    pub percentiles: Option<Percentiles>,
}

/// Percentile block of a metric
///
/// CrUX sends most p75 values as integers but CLS as a decimal string, so the
/// raw JSON value is kept and interpreted by [`CruxResponse::p75`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Percentiles {
    #[serde(default)]
    pub p75: Option<serde_json::Value>,
}

impl CruxResponse {
    /// `record.metrics.<name>.percentiles.p75` as a number
    ///
    /// Returns `None` when any level is missing or the value is not a finite number.
    pub fn p75(&self, metric_name: &str) -> Option<f64> {
        let raw = self
            .record
            .as_ref()?
            .metrics
            .get(metric_name)?
            .percentiles
            .as_ref()?
            .p75
            .as_ref()?;

        let value = match raw {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;

        value.is_finite().then_some(value)
    }
}
