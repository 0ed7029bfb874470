//! Crawl orchestrator - the page-by-page crawl loop
//!
//! The number of pages is unknown up front, so pages are fetched strictly one
//! after another: page N+1 is only requested once page N has been extracted
//! and reported a "next" control. Any fetch or extraction failure aborts the
//! crawl and nothing accumulated so far is returned.

use crate::config::SourceConfig;
use crate::crawler::extractor::{extract_page, ExtractedPage};
use crate::crawler::fetcher::PageFetcher;
use crate::item::Item;
use crate::{CatalogError, CrawlError};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Instant;

/// The full result of one crawl
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Every item, page 1 first, in document order within each page
    pub items: Vec<Item>,

    /// Number of pages fetched
    pub pages: u32,
}

/// Drives the fetch → extract → accumulate loop across all pages
#[derive(Debug, Clone)]
pub struct Crawler {
    fetcher: PageFetcher,
    max_pages: u32,
}

impl Crawler {
    /// Creates a crawler for the configured site
    pub fn new(config: &SourceConfig) -> Result<Self, CatalogError> {
        Ok(Self::with_fetcher(PageFetcher::new(config)?, config.max_pages))
    }

    /// Creates a crawler around an existing fetcher
    pub fn with_fetcher(fetcher: PageFetcher, max_pages: u32) -> Self {
        Self {
            fetcher,
            max_pages: max_pages.max(1),
        }
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Crawls the whole catalog
    ///
    /// # Termination
    ///
    /// The crawl ends normally on the first page without a "next" control.
    /// It aborts with [`CrawlError::PageLimit`] if `max_pages` pages were
    /// fetched and the last still reports more, and with
    /// [`CrawlError::PageLoop`] if a page repeats the exact items of an
    /// earlier page.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlResult)` - Every item from every page
    /// * `Err(CatalogError)` - The first failure; no partial result
    pub async fn crawl(&self) -> Result<CrawlResult, CatalogError> {
        tracing::info!("Starting catalog crawl of {}", self.fetcher.base_url());

        let start_time = Instant::now();
        let mut items = Vec::new();
        let mut fingerprints: HashMap<String, u32> = HashMap::new();
        let mut page = 1;

        loop {
            let url = self.fetcher.url_for(page)?;
            tracing::info!("Crawling page {}: {}", page, url);

            let body = self.fetcher.fetch_page(page).await?;
            let extracted = extract_page(&body, page, self.fetcher.base_url())?;

            if let Some(fingerprint) = page_fingerprint(&extracted) {
                if let Some(&duplicate_of) = fingerprints.get(&fingerprint) {
                    return Err(CrawlError::PageLoop { page, duplicate_of }.into());
                }
                fingerprints.insert(fingerprint, page);
            }

            tracing::debug!(
                "Page {} yielded {} items (next page: {})",
                page,
                extracted.items.len(),
                extracted.has_next
            );

            let has_next = extracted.has_next;
            items.extend(extracted.items);

            if !has_next {
                break;
            }

            if page >= self.max_pages {
                return Err(CrawlError::PageLimit {
                    max_pages: self.max_pages,
                }
                .into());
            }

            page += 1;
        }

        tracing::info!(
            "Crawl finished: {} items from {} pages in {:?}",
            items.len(),
            page,
            start_time.elapsed()
        );

        Ok(CrawlResult { items, pages: page })
    }
}

/// Hashes the detail URLs of a page's items, in order
///
/// Empty pages have no fingerprint, since they carry nothing to compare.
fn page_fingerprint(page: &ExtractedPage) -> Option<String> {
    if page.items.is_empty() {
        return None;
    }

    let mut hasher = Sha256::new();
    for item in &page.items {
        hasher.update(item.detail_page_url.as_bytes());
        hasher.update([0u8]);
    }
    Some(hex::encode(hasher.finalize()))
}
