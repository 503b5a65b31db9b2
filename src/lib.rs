//! Shelfscan: a catalog crawler that snapshots listing pages into typed records
//!
//! This crate walks a paginated catalog site, extracts one record per listed
//! item, enriches each record with its category from the item's detail page,
//! normalizes prices and star ratings, and persists the result as a CSV snapshot.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod state;

use thiserror::Error;

/// Main error type for Shelfscan operations
#[derive(Debug, Error)]
pub enum ShelfError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures surfaced by the HTTP transport after its retry policy has run
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a status outside the retryable set
    #[error("{url} rejected with HTTP {status}")]
    Rejected { url: String, status: u16 },

    /// Every attempt failed with a retryable status or connection error
    #[error("{url} failed after {attempts} attempts: {reason}")]
    Exhausted {
        url: String,
        attempts: u32,
        reason: String,
    },
}

/// Malformed markup at page, item, or detail granularity
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("item is missing {0}")]
    MissingField(&'static str),

    #[error("no pagination marker found")]
    MissingPagination,

    #[error("no breadcrumb trail found")]
    MissingBreadcrumb,

    #[error("invalid URL '{href}': {source}")]
    InvalidUrl {
        href: String,
        source: ::url::ParseError,
    },

    #[error("invalid selector '{0}'")]
    Selector(String),
}

/// Snapshot file read/write failures
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Configuration-specific errors
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
}

/// Result type alias for Shelfscan operations
pub type Result<T> = std::result::Result<T, ShelfError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, Crawler};
pub use record::{CrawlResult, NormalizedRecord, RawItem};
pub use state::PageOutcome;
