use crate::client::{read_success_body, ServiceError};
use reqwest::Client;
use serde::Serialize;
use url::Url;

#[derive(Debug, Serialize)]
struct UrlNotification<'a> {
    url: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Submits URLs to the Indexing API as `URL_UPDATED` notifications
#[derive(Debug, Clone)]
pub struct IndexingPublisher {
    http: Client,
    endpoint: Url,
}

impl IndexingPublisher {
    pub fn new(http: Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    /// Publishes one notification
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The notification was accepted
    /// * `Err(ServiceError)` - The service rejected it or was unreachable
    pub async fn submit(&self, token: &str, url: &str) -> Result<(), ServiceError> {
        let notification = UrlNotification {
            url,
            kind: "URL_UPDATED",
        };

        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .json(&notification)
            .send()
            .await?;

        read_success_body(response).await?;
        Ok(())
    }
}
