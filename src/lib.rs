//! Sitepulse: search-indexing and page-performance auditor
//!
//! This crate expands domain sitemaps into page URLs, inspects each page with the
//! Search Console URL Inspection API and the Chrome UX Report API, and writes a
//! prioritized CSV report with the worst pages first.

pub mod audit;
pub mod auth;
pub mod client;
pub mod config;
pub mod inspection;
pub mod metrics;
pub mod report;
pub mod sitemap;

use thiserror::Error;

/// Main error type for Sitepulse operations
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] auth::AuthError),

    #[error("Output error: {0}")]
    Output(#[from] report::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// Every variant is fatal and is raised before any per-URL request is made.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("No sitemap configured for domain '{0}'")]
    UnmappedDomain(String),

    #[error("CrUX API key is not set; set CRUX_API_KEY or credentials.crux-api-key")]
    MissingApiKey,
}

/// Result type alias for Sitepulse operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use audit::{run_audit, AuditOutcome, Auditor};
pub use config::Config;
pub use report::{assemble, UrlRecord};
pub use sitemap::resolve;
