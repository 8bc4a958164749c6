//! Indexing inspection module
//!
//! This module queries the Search Console URL Inspection API for each page and
//! normalizes the answer into the indexing half of a report row. A failed call
//! never escapes: it becomes an error-tagged row with a readable message.

mod publish;
mod types;

pub use publish::IndexingPublisher;
pub use types::{InspectionRequest, InspectionResponse};

use crate::client::{read_json, ServiceError};
use crate::report::{Field, IndexingFields, IndexingState};
use reqwest::Client;
use url::Url;

/// Client for the URL inspection endpoint
#[derive(Debug, Clone)]
pub struct InspectionClient {
    http: Client,
    endpoint: Url,
}

impl InspectionClient {
    pub fn new(http: Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    /// Sends one inspection request
    ///
    /// # Arguments
    ///
    /// * `token` - OAuth2 bearer token
    /// * `url` - The page to inspect
    /// * `site_url` - The Search Console property owning the page
    pub async fn inspect(
        &self,
        token: &str,
        url: &str,
        site_url: &str,
    ) -> Result<InspectionResponse, ServiceError> {
        let request = InspectionRequest {
            inspection_url: url,
            site_url,
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .json(&request)
            .send()
            .await?;

        read_json(response).await
    }

    /// Inspects a page and returns its indexing fields, whatever the outcome
    pub async fn inspect_url(&self, token: &str, url: &str, site_url: &str) -> IndexingFields {
        let result = self.inspect(token, url, site_url).await;
        to_indexing_fields(url, result)
    }
}

/// Converts an inspection outcome into report fields
///
/// Missing response fields become `N/A`. A failed call yields `ERROR: <code>`
/// as the state, `ERROR` elsewhere, and an error message.
pub fn to_indexing_fields(
    url: &str,
    result: Result<InspectionResponse, ServiceError>,
) -> IndexingFields {
    match result {
        Ok(response) => IndexingFields {
            indexing_state: IndexingState::from_reported(response.indexing_state()),
            crawl_status: Field::from_option(response.last_crawl_time().map(str::to_string)),
            mobile_usability: Field::from_option(response.mobile_verdict()),
            error_message: None,
        },
        Err(e) => {
            let message = describe_failure(url, &e);
            tracing::warn!("{}", message);
            IndexingFields {
                indexing_state: IndexingState::Error(e.status()),
                crawl_status: Field::Error,
                mobile_usability: Field::Error,
                error_message: Some(message),
            }
        }
    }
}

/// Builds the row's error message, with a hint for permission and quota failures
pub fn describe_failure(url: &str, error: &ServiceError) -> String {
    let mut message = format!("Error inspecting {}: {}", url, error);

    match error.status() {
        Some(403) => {
            message.push_str(" (Permission denied - check if service account has Owner role)")
        }
        Some(429) => message.push_str(" (Rate limit exceeded)"),
        _ => {}
    }

    message
}
