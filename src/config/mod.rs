//! Configuration module for Sitepulse
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use sitepulse::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitepulse.toml")).unwrap();
//! println!("Auditing {} domains", config.audit.domains.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    base_url, AuditConfig, Config, CredentialsConfig, EndpointsConfig, HttpConfig, OutputConfig,
    SitemapEntry, PLACEHOLDER_API_KEY,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, resolve_api_key,
};
pub use validation::{validate, validate_api_key};
