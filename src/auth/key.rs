use crate::auth::AuthError;
use serde::Deserialize;
use std::path::Path;

/// Token endpoint used when the key file does not name one
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a Google service-account key file that the token exchange needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Reads a service-account key file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSON key downloaded from the cloud console
    ///
    /// # Returns
    ///
    /// * `Ok(ServiceAccountKey)` - The parsed key
    /// * `Err(AuthError)` - The file is missing or is not a service-account key
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let content = std::fs::read_to_string(path).map_err(|e| AuthError::KeyFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_json(&content).map_err(|e| AuthError::KeyFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Parses a service-account key from its JSON text
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}
