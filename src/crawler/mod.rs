//! Crawler module for listing page traversal
//!
//! This module contains the crawl pipeline, leaves first:
//! - Page fetching by index
//! - Item extraction and field normalization
//! - The sequential page loop that accumulates the full catalog

mod extractor;
mod fetcher;
mod orchestrator;

pub use extractor::{extract_page, ExtractedPage};
pub use fetcher::{build_http_client, fetch_document, PageFetcher};
pub use orchestrator::{CrawlResult, Crawler};
