use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable holding the store connection string
pub const ENV_DATABASE: &str = "CATALOG_DATABASE";
/// Environment variable enabling the daily crawl (`true` to enable)
pub const ENV_ENABLE_CRON: &str = "ENABLE_CRON";
/// Environment variable overriding the listing site root
pub const ENV_BASE_URL: &str = "CATALOG_BASE_URL";
/// Environment variable overriding the API bind address
pub const ENV_BIND: &str = "CATALOG_BIND";

/// Loads configuration from an optional TOML file plus the process environment
///
/// Without a path every section takes its defaults. Environment overrides are
/// applied before validation.
///
/// # Arguments
///
/// * `path` - Optional path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: Option<&Path>) -> ConfigResult<Config> {
    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => Config::default(),
    };

    let config = apply_env_overrides(config, |name| std::env::var(name).ok())?;

    validate(&config)?;

    Ok(config)
}

/// Layers environment overrides onto a parsed configuration
///
/// `lookup` resolves a variable name to its value; tests pass a map-backed
/// closure instead of touching the real environment.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> ConfigResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(database) = lookup(ENV_DATABASE) {
        config.storage.database = database;
    }

    if let Some(flag) = lookup(ENV_ENABLE_CRON) {
        config.schedule.enabled = match flag.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => true,
            "false" | "0" | "no" | "" => false,
            _ => {
                return Err(ConfigError::InvalidEnv {
                    name: ENV_ENABLE_CRON,
                    value: flag,
                })
            }
        };
    }

    if let Some(base_url) = lookup(ENV_BASE_URL) {
        config.source.base_url = base_url;
    }

    if let Some(bind) = lookup(ENV_BIND) {
        config.api.bind = bind;
    }

    Ok(config)
}

/// Computes a SHA-256 hash of the effective configuration
///
/// Stored on each crawl run so runs can be tied back to the settings that
/// produced them.
pub fn compute_config_hash(config: &Config) -> ConfigResult<String> {
    let canonical = serde_json::to_string(config)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: Option<&Path>) -> ConfigResult<(Config, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(&config)?;
    Ok((config, hash))
}
