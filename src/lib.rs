//! Catalog-Sync: a paginated catalog crawler with a queryable store
//!
//! This crate walks a fixed-layout paginated listing site page by page,
//! normalizes every item container into an [`item::Item`], and replaces the
//! persisted catalog with the result of each completed crawl. A small HTTP API
//! exposes filtered, sorted and paginated reads plus an on-demand refresh.

pub mod api;
pub mod config;
pub mod crawler;
pub mod item;
pub mod output;
pub mod schedule;
pub mod storage;
pub mod sync;
pub mod url;

use thiserror::Error;

/// Main error type for Catalog-Sync operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Crawl error: {0}")]
    Crawl(#[from] CrawlError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid environment override {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Failures while retrieving a listing page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// Failures while turning a page's markup into item records
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Page {page}, item {position}: missing required field `{field}`")]
    MissingField {
        page: u32,
        position: usize,
        field: &'static str,
    },

    #[error("Page {page}, item {position}: unparseable price {raw:?}")]
    InvalidPrice {
        page: u32,
        position: usize,
        raw: String,
    },

    #[error("Page {page}, item {position}: cannot derive absolute URL from {raw:?}")]
    InvalidUrl {
        page: u32,
        position: usize,
        raw: String,
    },

    #[error("Invalid selector {css}: {message}")]
    Selector { css: &'static str, message: String },
}

/// Crawl-level bounds that abort a run
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Page limit of {max_pages} reached while the source still reports more pages")]
    PageLimit { max_pages: u32 },

    #[error("Page {page} repeats the items of page {duplicate_of}; refusing to loop")]
    PageLoop { page: u32, duplicate_of: u32 },
}

/// Result type alias for Catalog-Sync operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use item::{Item, Rating, StockStatus};
pub use sync::{CycleReport, CycleRunner, Trigger};
