use crate::config::types::{ApiConfig, Config, ScheduleConfig, SourceConfig, StorageConfig};
use crate::{ConfigError, ConfigResult};
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_source_config(&config.source)?;
    validate_storage_config(&config.storage)?;
    validate_schedule_config(&config.schedule)?;
    validate_api_config(&config.api)?;
    Ok(())
}

/// Validates the listing site configuration
fn validate_source_config(config: &SourceConfig) -> ConfigResult<()> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must use http or https, got '{}'",
            config.base_url
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url cannot carry a query or fragment, got '{}'",
            config.base_url
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates store configuration
fn validate_storage_config(config: &StorageConfig) -> ConfigResult<()> {
    if config.database.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates schedule configuration
///
/// The expression itself is parsed by the job scheduler when the job is
/// registered; here we only reject obviously unusable values.
fn validate_schedule_config(config: &ScheduleConfig) -> ConfigResult<()> {
    let fields = config.cron.split_whitespace().count();

    if config.enabled && !(6..=7).contains(&fields) {
        return Err(ConfigError::Validation(format!(
            "cron must have 6 or 7 fields (seconds first), got '{}'",
            config.cron
        )));
    }

    Ok(())
}

/// Validates API configuration
fn validate_api_config(config: &ApiConfig) -> ConfigResult<()> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("Invalid bind address '{}': {}", config.bind, e))
    })?;

    Ok(())
}
