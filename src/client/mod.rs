//! Shared HTTP plumbing
//!
//! This module builds the single HTTP client used for every upstream call and
//! defines the per-call result type the API clients return:
//! - `Ok(data)` for a decoded success response
//! - `Err(ServiceError)` carrying the HTTP status (when there was one) and a
//!   readable message

use crate::config::HttpConfig;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single upstream call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServiceError {
    /// The service answered with a non-success status
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    /// No usable response (connection refused, timeout, TLS failure)
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body did not have the expected shape
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Returns the HTTP status code, if the service sent one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Transport("Request timeout".to_string())
        } else if e.is_connect() {
            Self::Transport(format!("Connection refused: {}", e))
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Google APIs wrap failures as `{"error": {"code": .., "message": ..}}`
#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: GoogleErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorDetail {
    message: String,
}

/// Builds the HTTP client shared by all components
///
/// # Arguments
///
/// * `config` - HTTP settings (user agent and timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Decodes a JSON response, mapping non-success statuses to `ServiceError::Status`
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let body = read_success_body(response).await?;
    serde_json::from_str(&body).map_err(|e| ServiceError::Decode(e.to_string()))
}

/// Returns the body of a success response as text
pub async fn read_success_body(response: Response) -> Result<String, ServiceError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ServiceError::Status {
            code: status.as_u16(),
            message: error_message(status.canonical_reason(), &body),
        });
    }

    Ok(body)
}

/// Extracts the most useful message from an error response body
fn error_message(reason: Option<&str>, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<GoogleErrorBody>(body) {
        return parsed.error.message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        reason.unwrap_or("no response body").to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}
