//! Configuration module for Shelfscan
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a built-in default, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use shelfscan::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("shelfscan.toml")).unwrap();
//! println!("Page workers: {}", config.workers.pages);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{
    Config, OutputConfig, SiteConfig, TransportConfig, WorkerConfig, DEFAULT_BASE_URL,
    DEFAULT_SNAPSHOT_PATH, DEFAULT_USER_AGENT,
};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
