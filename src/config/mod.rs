//! Configuration module for Catalog-Sync
//!
//! This module handles loading, parsing, and validating the TOML configuration
//! file, then layering environment overrides on top of it. Every section has
//! defaults, so running without a file is valid.
//!
//! # Example
//!
//! ```no_run
//! use catalog_sync::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("catalog.toml"))).unwrap();
//! println!("Crawling {}", config.source.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ApiConfig, Config, ScheduleConfig, SourceConfig, StorageConfig};

// Re-export parser functions
pub use parser::{apply_env_overrides, compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
