use serde::Deserialize;

/// Placeholder value shipped in sample configs; treated the same as a missing key
pub const PLACEHOLDER_API_KEY: &str = "YOUR_CRUX_API_KEY";

/// Main configuration structure for Sitepulse
///
/// Built once at startup and handed to every component; nothing reads global state.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub audit: AuditConfig,
    pub credentials: CredentialsConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub sitemap: Vec<SitemapEntry>,
}

/// Audit run behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AuditConfig {
    /// Search Console properties to audit (e.g. "sc-domain:example.com")
    pub domains: Vec<String>,

    /// Maximum number of sitemap URLs inspected per domain
    #[serde(default = "default_url_limit")]
    pub url_limit: usize,

    /// Pause after every external API call (milliseconds)
    #[serde(default = "default_api_delay_ms")]
    pub api_delay_ms: u64,

    /// Submit pages with an indexing problem to the Indexing API
    #[serde(default)]
    pub submit_unindexed: bool,
}

/// Credential locations
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CredentialsConfig {
    /// Path to the Google service-account JSON key file
    pub service_account_key: String,

    /// CrUX API key; the CRUX_API_KEY environment variable takes precedence
    #[serde(default)]
    pub crux_api_key: Option<String>,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory the timestamped CSV report is written to
    pub directory: String,

    /// File name prefix; the run timestamp and `.csv` are appended
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

/// HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Upstream API endpoints
///
/// Defaults are the public Google endpoints; tests point these at mock servers.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EndpointsConfig {
    #[serde(default = "default_inspection_endpoint")]
    pub inspection: String,

    #[serde(default = "default_crux_endpoint")]
    pub crux: String,

    #[serde(default = "default_indexing_endpoint")]
    pub indexing: String,
}

/// One row of the domain-to-sitemap table
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SitemapEntry {
    /// Substring matched against the domain's base URL
    #[serde(rename = "match")]
    pub pattern: String,

    /// Sitemap (or sitemap index) URL for matching domains
    pub url: String,

    /// Paths appended to the base URL when the sitemap yields nothing
    #[serde(default)]
    pub fallback_paths: Vec<String>,
}

impl Config {
    /// Looks up the sitemap entry for a domain
    ///
    /// The first entry whose pattern occurs in the domain's base URL wins.
    pub fn sitemap_for(&self, domain: &str) -> Option<&SitemapEntry> {
        let base = base_url(domain);
        self.sitemap
            .iter()
            .find(|entry| base.contains(entry.pattern.as_str()))
    }
}

/// Converts a Search Console property into the site's base URL
///
/// `sc-domain:example.com` becomes `https://example.com`; URL-prefix properties
/// lose their trailing slash.
pub fn base_url(domain: &str) -> String {
    domain
        .replace("sc-domain:", "https://")
        .trim_end_matches('/')
        .to_string()
}

fn default_url_limit() -> usize {
    1000
}

fn default_api_delay_ms() -> u64 {
    200
}

fn default_file_prefix() -> String {
    "gsc_inspection_report".to_string()
}

fn default_user_agent() -> String {
    format!("sitepulse/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_inspection_endpoint() -> String {
    "https://searchconsole.googleapis.com/v1/urlInspection/index:inspect".to_string()
}

fn default_crux_endpoint() -> String {
    "https://chromeuxreport.googleapis.com/v1/records:queryRecord".to_string()
}

fn default_indexing_endpoint() -> String {
    "https://indexing.googleapis.com/v3/urlNotifications:publish".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            inspection: default_inspection_endpoint(),
            crux: default_crux_endpoint(),
            indexing: default_indexing_endpoint(),
        }
    }
}
