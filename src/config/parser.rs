use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable that overrides `credentials.crux-api-key`
pub const CRUX_API_KEY_ENV: &str = "CRUX_API_KEY";

/// Loads and parses a configuration file from the given path
///
/// The CrUX API key is taken from the `CRUX_API_KEY` environment variable when
/// it is set, falling back to `credentials.crux-api-key` in the file.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitepulse::config::load_config;
///
/// let config = load_config(Path::new("sitepulse.toml")).unwrap();
/// println!("URL limit: {}", config.audit.url_limit);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content, std::env::var(CRUX_API_KEY_ENV).ok())
}

/// Parses and validates configuration text
///
/// # Arguments
///
/// * `content` - TOML configuration text
/// * `env_api_key` - Value of the API key environment variable, if any
pub fn parse_config(content: &str, env_api_key: Option<String>) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(content)?;

    config.credentials.crux_api_key =
        resolve_api_key(config.credentials.crux_api_key.take(), env_api_key);

    validate(&config)?;

    Ok(config)
}

/// Picks the effective CrUX API key
///
/// A non-blank environment value wins over the configured one.
pub fn resolve_api_key(configured: Option<String>, env: Option<String>) -> Option<String> {
    env.filter(|key| !key.trim().is_empty()).or(configured)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a report can be traced back to the configuration that
/// produced it.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
