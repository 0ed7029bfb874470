//! Output module for catalog reports
//!
//! This module handles:
//! - Loading aggregate catalog statistics and the latest crawl run
//! - Rendering them for the `--stats` command

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, CatalogStatistics};
