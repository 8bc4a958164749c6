//! Real-user performance metrics module
//!
//! This module fetches p75 Core Web Vitals from the Chrome UX Report API and
//! flags the metrics that exceed their thresholds.
//!
//! # Outcome mapping
//!
//! | Response | Metrics | Problems |
//! |----------|---------|----------|
//! | 200 | p75 values, `N/A` where missing | breaches or `None` |
//! | 404 | `NO_DATA` | `No CrUX data` |
//! | anything else | `ERROR` | `ERROR` |

mod thresholds;
mod types;

pub use thresholds::{find_breaches, Metric};
pub use types::{CruxQuery, CruxResponse};

use crate::client::{read_json, ServiceError};
use crate::config::validate_api_key;
use crate::report::{MetricValue, PerformanceFields, PerformanceProblems};
use crate::ConfigError;
use reqwest::Client;
use url::Url;

/// Client for the CrUX `records:queryRecord` endpoint
#[derive(Debug, Clone)]
pub struct CruxClient {
    http: Client,
    endpoint: Url,
}

impl CruxClient {
    /// Creates a client, rejecting a missing or placeholder API key
    ///
    /// # Arguments
    ///
    /// * `http` - Shared HTTP client
    /// * `endpoint` - The query endpoint
    /// * `api_key` - CrUX API key, sent as the `key` query parameter
    pub fn new(http: Client, endpoint: Url, api_key: Option<&str>) -> Result<Self, ConfigError> {
        let api_key = validate_api_key(api_key)?;

        let mut endpoint = endpoint;
        endpoint.query_pairs_mut().append_pair("key", api_key);

        Ok(Self { http, endpoint })
    }

    /// Sends one record query
    pub async fn query(&self, url: &str) -> Result<CruxResponse, ServiceError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&CruxQuery { url })
            .send()
            .await?;

        read_json(response).await
    }

    /// Fetches the performance fields for a page, whatever the outcome
    pub async fn fetch_metrics(&self, url: &str) -> PerformanceFields {
        let result = self.query(url).await;
        to_performance_fields(url, result)
    }
}

/// Converts a query outcome into report fields
pub fn to_performance_fields(
    url: &str,
    result: Result<CruxResponse, ServiceError>,
) -> PerformanceFields {
    match result {
        Ok(response) => from_response(&response),
        Err(e) if e.status() == Some(404) => {
            tracing::info!(
                "No CrUX data available for {} (404 Not Found). This URL may not have enough traffic.",
                url
            );
            PerformanceFields::no_data()
        }
        Err(e) => {
            tracing::warn!("Error fetching CrUX data for {}: {}", url, e);
            PerformanceFields::error()
        }
    }
}

/// Extracts the five p75 metrics and their breaches from a response
pub fn from_response(response: &CruxResponse) -> PerformanceFields {
    let value = |metric: Metric| match response.p75(metric.crux_name()) {
        Some(v) => MetricValue::Value(v),
        None => MetricValue::NotAvailable,
    };

    let mut fields = PerformanceFields {
        lcp: value(Metric::Lcp),
        ttfb: value(Metric::Ttfb),
        cls: value(Metric::Cls),
        fcp: value(Metric::Fcp),
        inp: value(Metric::Inp),
        problems: PerformanceProblems::Breaches(Vec::new()),
    };
    fields.problems = PerformanceProblems::Breaches(find_breaches(&fields));
    fields
}
