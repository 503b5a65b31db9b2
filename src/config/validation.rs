use crate::config::types::{Config, OutputConfig, SiteConfig, TransportConfig, WorkerConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Runs before any network I/O so a bad setting fails the run up front.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_transport_config(&config.transport)?;
    validate_worker_config(&config.workers)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site settings
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    // Url::join drops the last path segment unless the base ends in a slash
    if !url.path().ends_with('/') {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must end with '/'",
            config.base_url
        )));
    }

    if config.start_page < 1 {
        return Err(ConfigError::Validation(
            "start-page must be >= 1, got 0".to_string(),
        ));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max-pages must be >= 1, got 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates HTTP client settings
fn validate_transport_config(config: &TransportConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if let Some(status) = config
        .retry_statuses
        .iter()
        .find(|s| !(100..=599).contains(*s))
    {
        return Err(ConfigError::Validation(format!(
            "retry-statuses must be valid HTTP status codes, got {}",
            status
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the worker pool limits
fn validate_worker_config(config: &WorkerConfig) -> Result<(), ConfigError> {
    if config.pages < 1 {
        return Err(ConfigError::Validation(format!(
            "workers.pages must be >= 1, got {}",
            config.pages
        )));
    }

    if config.details < 1 {
        return Err(ConfigError::Validation(format!(
            "workers.details must be >= 1, got {}",
            config.details
        )));
    }

    let in_flight = config.pages.saturating_mul(config.details);
    if in_flight > config.max_in_flight {
        return Err(ConfigError::Validation(format!(
            "workers.pages * workers.details = {} exceeds max-in-flight ({})",
            in_flight, config.max_in_flight
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.snapshot_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "snapshot-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
