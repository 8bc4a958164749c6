use crate::config::types::{
    AuditConfig, Config, CredentialsConfig, EndpointsConfig, HttpConfig, OutputConfig,
    SitemapEntry, PLACEHOLDER_API_KEY,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_audit_config(&config.audit)?;
    validate_credentials_config(&config.credentials)?;
    validate_output_config(&config.output)?;
    validate_http_config(&config.http)?;
    validate_endpoints(&config.endpoints)?;
    validate_sitemap_entries(&config.sitemap)?;
    validate_domain_mapping(config)?;
    Ok(())
}

/// Rejects a missing, blank, or placeholder CrUX API key
pub fn validate_api_key(key: Option<&str>) -> Result<&str, ConfigError> {
    match key.map(str::trim) {
        Some(key) if !key.is_empty() && key != PLACEHOLDER_API_KEY => Ok(key),
        _ => Err(ConfigError::MissingApiKey),
    }
}

/// Validates audit run settings
fn validate_audit_config(config: &AuditConfig) -> Result<(), ConfigError> {
    if config.domains.is_empty() {
        return Err(ConfigError::Validation(
            "audit.domains must list at least one domain".to_string(),
        ));
    }

    for domain in &config.domains {
        validate_property(domain)?;
    }

    if config.url_limit < 1 {
        return Err(ConfigError::Validation(format!(
            "url_limit must be >= 1, got {}",
            config.url_limit
        )));
    }

    Ok(())
}

/// Validates credential settings
fn validate_credentials_config(config: &CredentialsConfig) -> Result<(), ConfigError> {
    if config.service_account_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "service_account_key cannot be empty".to_string(),
        ));
    }

    validate_api_key(config.crux_api_key.as_deref())?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_prefix.is_empty()
        || config
            .file_prefix
            .chars()
            .any(|c| c == '/' || c == '\\')
    {
        return Err(ConfigError::Validation(format!(
            "file_prefix must be a non-empty file name, got '{}'",
            config.file_prefix
        )));
    }

    Ok(())
}

fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

fn validate_endpoints(config: &EndpointsConfig) -> Result<(), ConfigError> {
    validate_http_url("endpoints.inspection", &config.inspection)?;
    validate_http_url("endpoints.crux", &config.crux)?;
    validate_http_url("endpoints.indexing", &config.indexing)?;
    Ok(())
}

/// Validates the domain-to-sitemap table
fn validate_sitemap_entries(entries: &[SitemapEntry]) -> Result<(), ConfigError> {
    for entry in entries {
        if entry.pattern.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "sitemap entry for '{}' has an empty match pattern",
                entry.url
            )));
        }

        validate_http_url("sitemap url", &entry.url)?;
    }

    Ok(())
}

/// Every configured domain must resolve to a sitemap before any request is made
fn validate_domain_mapping(config: &Config) -> Result<(), ConfigError> {
    for domain in &config.audit.domains {
        if config.sitemap_for(domain).is_none() {
            return Err(ConfigError::UnmappedDomain(domain.clone()));
        }
    }

    Ok(())
}

/// Validates a Search Console property identifier
///
/// Accepts domain properties (`sc-domain:example.com`) and URL-prefix
/// properties (`https://example.com/`).
fn validate_property(property: &str) -> Result<(), ConfigError> {
    if let Some(domain) = property.strip_prefix("sc-domain:") {
        return validate_domain_string(domain);
    }

    validate_http_url("domain property", property)
}

/// Validates a domain string
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::Validation("Domain cannot be empty".to_string()));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
