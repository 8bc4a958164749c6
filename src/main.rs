//! Sitepulse main entry point
//!
//! This is the command-line interface for the Sitepulse indexing and performance auditor.

use anyhow::Context;
use clap::Parser;
use sitepulse::config::{load_config_with_hash, validate, Config};
use sitepulse::report::print_summary;
use sitepulse::run_audit;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitepulse: a search-indexing and page-performance auditor
///
/// Sitepulse expands each configured domain's sitemap, checks every page's
/// Search Console indexing status and Chrome UX Report metrics, and writes a
/// CSV report with the most urgent pages first.
#[derive(Parser, Debug)]
#[command(name = "sitepulse")]
#[command(version)]
#[command(about = "Search-indexing and page-performance auditor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show which sitemaps would be read without calling any API
    #[arg(long)]
    dry_run: bool,

    /// Maximum number of URLs taken from each sitemap
    #[arg(long, value_name = "N")]
    limit: Option<usize>,

    /// Pause after every API call, in milliseconds
    #[arg(long, value_name = "MS")]
    delay_ms: Option<u64>,

    /// Directory the CSV report is written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<String>,

    /// Submit pages that are not indexed to the Indexing API
    #[arg(long)]
    submit_unindexed: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(limit) = self.limit {
            config.audit.url_limit = limit;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.audit.api_delay_ms = delay_ms;
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }
        if self.submit_unindexed {
            config.audit.submit_unindexed = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    cli.apply_overrides(&mut config);
    validate(&config).context("invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_audit(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitepulse=info,warn"),
            1 => EnvFilter::new("sitepulse=debug,info"),
            2 => EnvFilter::new("sitepulse=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the domain to sitemap mapping
fn handle_dry_run(config: &Config) {
    println!("=== Sitepulse Dry Run ===\n");

    println!("Audit Configuration:");
    println!("  URL limit per sitemap: {}", config.audit.url_limit);
    println!("  API delay: {}ms", config.audit.api_delay_ms);
    println!("  Submit unindexed: {}", config.audit.submit_unindexed);

    println!("\nEndpoints:");
    println!("  Inspection: {}", config.endpoints.inspection);
    println!("  CrUX: {}", config.endpoints.crux);
    if config.audit.submit_unindexed {
        println!("  Indexing: {}", config.endpoints.indexing);
    }

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);
    println!("  File prefix: {}", config.output.file_prefix);

    println!("\nDomains ({}):", config.audit.domains.len());
    for domain in &config.audit.domains {
        match config.sitemap_for(domain) {
            Some(entry) => {
                println!("  - {} -> {}", domain, entry.url);
                for path in &entry.fallback_paths {
                    println!("    * fallback: {}", if path.is_empty() { "/" } else { path });
                }
            }
            None => println!("  - {} -> (no sitemap)", domain),
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main audit operation
async fn handle_audit(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Domains: {}, URL limit: {}, API delay: {}ms",
        config.audit.domains.len(),
        config.audit.url_limit,
        config.audit.api_delay_ms
    );

    let outcome = run_audit(config).await.context("audit failed")?;

    println!();
    print_summary(&outcome.summary);
    println!("\nReport saved to: {}", outcome.report_path.display());

    Ok(())
}
