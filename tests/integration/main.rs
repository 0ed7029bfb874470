//! Integration tests for Catalog-Sync
//!
//! A wiremock server stands in for the listing site; storage is in-memory
//! SQLite.

mod api_tests;
mod crawl_tests;
