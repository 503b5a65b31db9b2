use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://books.toscrape.com/catalogue/";
pub const DEFAULT_SNAPSHOT_PATH: &str = "/tmp/data/books.csv";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Shelfscan
///
/// Every section is optional in the TOML file; missing keys fall back to
/// the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub workers: WorkerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Target catalog and how much of it to crawl
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Catalog root; listing pages and relative item links resolve against it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// First listing page number when the caller does not pick one
    #[serde(rename = "start-page")]
    pub start_page: u32,

    /// Ceiling on the number of listing pages scheduled per run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            start_page: 1,
            max_pages: 50,
        }
    }
}

/// HTTP client behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Whether TLS certificates are verified
    #[serde(rename = "verify-tls")]
    pub verify_tls: bool,

    /// Number of retries after the first attempt
    pub retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// HTTP statuses that are retried instead of rejected
    #[serde(rename = "retry-statuses")]
    pub retry_statuses: Vec<u16>,

    /// Fixed identity header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            verify_tls: false,
            retries: 3,
            backoff_base_ms: 300,
            retry_statuses: vec![500, 502, 503, 504],
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Concurrency limits for the two worker pools
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Concurrent listing page tasks
    pub pages: usize,

    /// Concurrent detail fetches within one page's batch
    pub details: usize,

    /// Upper bound for pages * details, the worst-case number of in-flight requests
    #[serde(rename = "max-in-flight")]
    pub max_in_flight: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pages: 10,
            details: 20,
            max_in_flight: 400,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the CSV snapshot file
    #[serde(rename = "snapshot-path")]
    pub snapshot_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshot_path: DEFAULT_SNAPSHOT_PATH.to_string(),
        }
    }
}
