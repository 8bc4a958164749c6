//! Service-account authentication
//!
//! This module exchanges a Google service-account key for OAuth2 bearer tokens:
//! - Loading the JSON key file
//! - Signing an RS256 JWT assertion for the requested scopes
//! - Trading the assertion for an access token at the key's token endpoint
//! - Reusing the token until shortly before it expires

mod key;

pub use key::{ServiceAccountKey, DEFAULT_TOKEN_URI};

use crate::client::{read_json, ServiceError};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Read access to Search Console data (URL inspection)
pub const WEBMASTERS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/webmasters.readonly";

/// Publishing URL notifications to the Indexing API
pub const INDEXING_SCOPE: &str = "https://www.googleapis.com/auth/indexing";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

/// Errors raised while obtaining an access token
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to load service account key {path}: {message}")]
    KeyFile { path: String, message: String },

    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Token exchange failed: {0}")]
    Exchange(#[from] ServiceError),
}

/// Claims of the JWT bearer assertion
#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

/// A bearer token and the instant it stops being valid
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// True when the token expires within the refresh margin of `now`
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) <= now
    }
}

/// Hands out bearer tokens for a service account, refreshing them on expiry
pub struct TokenSource {
    client: Client,
    key: ServiceAccountKey,
    scopes: Vec<String>,
    current: Option<AccessToken>,
}

impl TokenSource {
    /// Creates a token source for the given key and scopes
    pub fn new(client: Client, key: ServiceAccountKey, scopes: &[&str]) -> Self {
        Self {
            client,
            key,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
            current: None,
        }
    }

    /// Returns a valid bearer token, exchanging a new assertion when needed
    pub async fn bearer(&mut self) -> Result<String, AuthError> {
        let now = Utc::now();

        if let Some(token) = &self.current {
            if !token.needs_refresh(now) {
                return Ok(token.token.clone());
            }
        }

        let token = self.exchange(now).await?;
        tracing::debug!("Obtained access token valid until {}", token.expires_at);
        let bearer = token.token.clone();
        self.current = Some(token);
        Ok(bearer)
    }

    /// Builds the signed JWT assertion for `now`
    pub fn assertion(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: self.scopes.join(" "),
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<AccessToken, AuthError> {
        let assertion = self.assertion(now)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(ServiceError::from)?;

        let body: TokenResponse = read_json(response).await?;

        Ok(AccessToken {
            expires_at: token_expiry(now, body.expires_in)?,
            token: body.access_token,
        })
    }
}

/// Instant a token issued at `now` expires, rejecting lifetimes chrono cannot represent
fn token_expiry(now: DateTime<Utc>, expires_in: i64) -> Result<DateTime<Utc>, AuthError> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .ok_or_else(|| {
            AuthError::Exchange(ServiceError::Decode(format!(
                "expires_in out of range: {}",
                expires_in
            )))
        })
}
