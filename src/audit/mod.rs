//! Audit orchestration module
//!
//! Runs one domain at a time and one URL at a time, with a fixed pause after
//! each external call. Per-URL failures degrade to sentinel values in that
//! URL's row; only configuration and credential problems stop a run.

mod coordinator;

pub use coordinator::{AuditOutcome, Auditor};

use crate::config::Config;
use crate::AuditError;

/// Runs a complete audit
///
/// This is the main entry point for an audit run. It will:
/// 1. Load credentials and build the API clients
/// 2. Obtain an access token
/// 3. Resolve each domain's sitemap
/// 4. Inspect and measure every URL
/// 5. Score, sort, and write the report
///
/// # Arguments
///
/// * `config` - A validated configuration
///
/// # Returns
///
/// * `Ok(AuditOutcome)` - Audit completed and the report was written
/// * `Err(AuditError)` - Configuration, credential, or output failure
pub async fn run_audit(config: Config) -> Result<AuditOutcome, AuditError> {
    let mut auditor = Auditor::new(config)?;
    auditor.run().await
}
