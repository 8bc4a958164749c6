//! Audit coordinator - main orchestration logic
//!
//! This module contains the sequential audit loop:
//! - Authenticating once before any page is inspected
//! - Expanding each domain's sitemap into URLs
//! - Inspecting indexing status, then fetching performance metrics, per URL
//! - Pausing after every external call
//! - Assembling and writing the final report

use crate::auth::{ServiceAccountKey, TokenSource, INDEXING_SCOPE, WEBMASTERS_READONLY_SCOPE};
use crate::client::{build_http_client, ServiceError};
use crate::config::Config;
use crate::inspection::{to_indexing_fields, IndexingPublisher, InspectionClient};
use crate::metrics::CruxClient;
use crate::report::{
    assemble, CsvReportWriter, IndexingFields, IndexingState, ReportSummary, ReportWriter,
    UrlRecord,
};
use crate::sitemap::urls_to_inspect;
use crate::AuditError;
use chrono::Local;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use url::Url;

/// Result of a completed audit run
#[derive(Debug, Clone)]
pub struct AuditOutcome {
    /// Where the CSV report was written
    pub report_path: PathBuf,
    /// Records in report order
    pub records: Vec<UrlRecord>,
    pub summary: ReportSummary,
}

/// Main audit coordinator structure
pub struct Auditor {
    config: Config,
    http: Client,
    tokens: TokenSource,
    inspector: InspectionClient,
    crux: CruxClient,
    publisher: Option<IndexingPublisher>,
    delay: Duration,
}

impl Auditor {
    /// Creates a new auditor
    ///
    /// Loads the service-account key and builds every API client. All failures
    /// here are configuration problems and happen before any network call.
    ///
    /// # Arguments
    ///
    /// * `config` - A validated configuration
    pub fn new(config: Config) -> Result<Self, AuditError> {
        let http = build_http_client(&config.http)?;

        let key = ServiceAccountKey::from_file(Path::new(&config.credentials.service_account_key))?;
        let scopes: &[&str] = if config.audit.submit_unindexed {
            &[WEBMASTERS_READONLY_SCOPE, INDEXING_SCOPE]
        } else {
            &[WEBMASTERS_READONLY_SCOPE]
        };
        let tokens = TokenSource::new(http.clone(), key, scopes);

        let inspector = InspectionClient::new(http.clone(), Url::parse(&config.endpoints.inspection)?);
        let crux = CruxClient::new(
            http.clone(),
            Url::parse(&config.endpoints.crux)?,
            config.credentials.crux_api_key.as_deref(),
        )?;

        let publisher = if config.audit.submit_unindexed {
            Some(IndexingPublisher::new(
                http.clone(),
                Url::parse(&config.endpoints.indexing)?,
            ))
        } else {
            None
        };

        let delay = Duration::from_millis(config.audit.api_delay_ms);

        Ok(Self {
            config,
            http,
            tokens,
            inspector,
            crux,
            publisher,
            delay,
        })
    }

    /// Runs the audit and writes the report into the configured directory
    pub async fn run(&mut self) -> Result<AuditOutcome, AuditError> {
        let writer = CsvReportWriter::new(
            &self.config.output.directory,
            self.config.output.file_prefix.as_str(),
            Local::now(),
        );
        self.run_with_writer(&writer).await
    }

    /// Runs the audit and hands the ordered records to `writer`
    pub async fn run_with_writer(
        &mut self,
        writer: &dyn ReportWriter,
    ) -> Result<AuditOutcome, AuditError> {
        let start_time = Instant::now();

        // A token failure here means the credentials are unusable for every URL
        self.tokens.bearer().await?;

        let records = assemble(self.collect().await?);
        let summary = ReportSummary::from_records(&records);
        let report_path = writer.write(&records)?;

        tracing::info!(
            "Audit completed: {} URLs in {:?}, report saved to {}",
            records.len(),
            start_time.elapsed(),
            report_path.display()
        );

        Ok(AuditOutcome {
            report_path,
            records,
            summary,
        })
    }

    /// Inspects every URL of every configured domain, in configuration and sitemap order
    pub async fn collect(&mut self) -> Result<Vec<UrlRecord>, AuditError> {
        let mut records = Vec::new();
        let start_time = Instant::now();

        let domains = self.config.audit.domains.clone();
        for domain in &domains {
            tracing::info!("Processing domain: {}", domain);
            let urls = urls_to_inspect(&self.http, &self.config, domain).await?;

            for url in &urls {
                let record = self.inspect_page(url, domain).await;
                records.push(record);

                if records.len() % 10 == 0 {
                    let rate = records.len() as f64 / start_time.elapsed().as_secs_f64();
                    tracing::info!(
                        "Progress: {} URLs inspected, {:.2} URLs/sec",
                        records.len(),
                        rate
                    );
                }
            }
        }

        Ok(records)
    }

    /// Produces the record for one URL
    ///
    /// The inspection and metrics calls always yield fields, so every URL
    /// produces exactly one record.
    async fn inspect_page(&mut self, url: &str, domain: &str) -> UrlRecord {
        tracing::info!("Inspecting {}...", url);

        let indexing = self.inspect_indexing(url, domain).await;
        self.pause().await;

        let performance = self.crux.fetch_metrics(url).await;
        self.pause().await;

        if matches!(indexing.indexing_state, IndexingState::Other(_)) {
            self.submit_for_indexing(url).await;
        }

        UrlRecord::new(url, indexing, performance)
    }

    async fn inspect_indexing(&mut self, url: &str, domain: &str) -> IndexingFields {
        match self.tokens.bearer().await {
            Ok(token) => self.inspector.inspect_url(&token, url, domain).await,
            Err(e) => to_indexing_fields(
                url,
                Err(ServiceError::Transport(format!("authentication failed: {}", e))),
            ),
        }
    }

    /// Submits a not-indexed URL when submission is enabled
    async fn submit_for_indexing(&mut self, url: &str) {
        let Some(publisher) = self.publisher.clone() else {
            return;
        };

        tracing::info!("{} is not indexed. Submitting...", url);
        let result = match self.tokens.bearer().await {
            Ok(token) => publisher.submit(&token, url).await,
            Err(e) => Err(ServiceError::Transport(format!("authentication failed: {}", e))),
        };

        match result {
            Ok(()) => tracing::info!("Submitted {} for indexing", url),
            Err(e) => tracing::warn!("Error submitting {} for indexing: {}", url, e),
        }

        self.pause().await;
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}
