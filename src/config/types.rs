use serde::{Deserialize, Serialize};

/// Daily at 02:00 UTC, six-field cron syntax (seconds first)
pub const DEFAULT_CRON: &str = "0 0 2 * * *";

/// Main configuration structure for Catalog-Sync
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Listing site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Root of the listing site, without a trailing slash
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Hard ceiling on pages walked in one crawl
    #[serde(rename = "max-pages", default = "default_max_pages")]
    pub max_pages: u32,

    /// User-Agent header sent with every page request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// SQLite connection string: a file path or `:memory:`
    #[serde(default = "default_database")]
    pub database: String,
}

/// Recurring crawl configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Whether the daily crawl is scheduled after the startup crawl
    #[serde(default)]
    pub enabled: bool,

    /// Cron expression for the recurring crawl
    #[serde(default = "default_cron")]
    pub cron: String,
}

/// Query API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Socket address the HTTP API binds to
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_pages: default_max_pages(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cron: default_cron(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_base_url() -> String {
    "https://books.toscrape.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_pages() -> u32 {
    1000
}

fn default_user_agent() -> String {
    format!("catalog-sync/{}", env!("CARGO_PKG_VERSION"))
}

fn default_database() -> String {
    "./catalog.db".to_string()
}

fn default_cron() -> String {
    DEFAULT_CRON.to_string()
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}
