//! Sitemap resolution module
//!
//! This module fetches sitemaps and expands sitemap indexes into an ordered,
//! capped list of page URLs. Fetching fails soft: an unreachable or malformed
//! sitemap contributes no URLs and the run carries on.

mod parser;

pub use parser::{parse_sitemap, SitemapDocument, SitemapError, SITEMAP_NAMESPACE};

use crate::client::read_success_body;
use crate::config::{base_url, Config, SitemapEntry};
use crate::ConfigError;
use reqwest::Client;
use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Vec<String>> + Send + 'a>>;

/// Resolves a sitemap into at most `limit` page URLs
///
/// Child sitemaps of an index are expanded in document order without a limit
/// of their own; no further children are fetched once `limit` URLs have been
/// collected, and the concatenation is then truncated to `limit`.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `sitemap_url` - URL of a sitemap or sitemap index
/// * `limit` - Maximum number of URLs returned
///
/// # Returns
///
/// The page URLs in sitemap order; empty when nothing could be fetched or parsed
pub async fn resolve(client: &Client, sitemap_url: &str, limit: usize) -> Vec<String> {
    let mut visited = HashSet::new();
    resolve_node(client, sitemap_url, Some(limit), &mut visited).await
}

fn resolve_node<'a>(
    client: &'a Client,
    sitemap_url: &'a str,
    limit: Option<usize>,
    visited: &'a mut HashSet<String>,
) -> ResolveFuture<'a> {
    Box::pin(async move {
        if !visited.insert(sitemap_url.to_string()) {
            tracing::warn!("Skipping already visited sitemap {}", sitemap_url);
            return Vec::new();
        }

        let document = match fetch_sitemap(client, sitemap_url).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Error fetching sitemap {}: {}", sitemap_url, e);
                return Vec::new();
            }
        };

        let mut urls = match document {
            SitemapDocument::Index(children) => {
                let mut all_urls = Vec::new();
                for child in &children {
                    tracing::debug!("Fetching child sitemap: {}", child);
                    let mut child_urls = resolve_node(client, child, None, visited).await;
                    all_urls.append(&mut child_urls);

                    if limit.is_some_and(|limit| all_urls.len() >= limit) {
                        break;
                    }
                }
                all_urls
            }
            SitemapDocument::UrlSet(pages) => pages,
        };

        if let Some(limit) = limit {
            urls.truncate(limit);
        }

        urls
    })
}

/// Fetches and parses a single sitemap document
async fn fetch_sitemap(client: &Client, sitemap_url: &str) -> Result<SitemapDocument, SitemapError> {
    let response = client
        .get(sitemap_url)
        .send()
        .await
        .map_err(|e| SitemapError::Fetch(e.to_string()))?;

    let body = read_success_body(response)
        .await
        .map_err(|e| SitemapError::Fetch(e.to_string()))?;

    parse_sitemap(&body)
}

/// Builds the fallback URL list for a domain
///
/// Each configured path is appended to the domain's base URL; an empty path
/// yields the base URL itself.
pub fn fallback_urls(domain: &str, entry: &SitemapEntry) -> Vec<String> {
    let base = base_url(domain);
    entry
        .fallback_paths
        .iter()
        .map(|path| format!("{}{}", base, path))
        .collect()
}

/// Produces the URLs to inspect for one configured domain
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Sitemap URLs, or the fallback list when the sitemap yields none
/// * `Err(ConfigError)` - The domain has no sitemap mapping
pub async fn urls_to_inspect(
    client: &Client,
    config: &Config,
    domain: &str,
) -> Result<Vec<String>, ConfigError> {
    let entry = config
        .sitemap_for(domain)
        .ok_or_else(|| ConfigError::UnmappedDomain(domain.to_string()))?;

    tracing::info!("Fetching URLs from sitemap: {}", entry.url);
    let urls = resolve(client, &entry.url, config.audit.url_limit).await;

    if urls.is_empty() {
        tracing::warn!(
            "No URLs found in sitemap for {}. Falling back to default URLs.",
            base_url(domain)
        );
        return Ok(fallback_urls(domain, entry));
    }

    tracing::info!("Resolved {} URLs for {}", urls.len(), domain);
    Ok(urls)
}
