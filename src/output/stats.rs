//! Statistics over the stored catalog
//!
//! This module provides functionality for extracting and displaying
//! catalog statistics from the storage layer.

use crate::item::Rating;
use crate::storage::{CatalogSummary, RunRecord, Storage, StorageResult};
use std::fmt::Write;

/// Catalog statistics plus the run that produced the catalog
#[derive(Debug, Clone)]
pub struct CatalogStatistics {
    pub summary: CatalogSummary,

    /// Most recent crawl run, successful or not
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CatalogStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<CatalogStatistics> {
    Ok(CatalogStatistics {
        summary: storage.catalog_summary()?,
        latest_run: storage.get_latest_run()?,
    })
}

/// Renders statistics as a plain-text report
pub fn format_statistics(stats: &CatalogStatistics) -> String {
    let summary = &stats.summary;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "=== Catalog Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Total items: {}", summary.total_items);
    let _ = writeln!(
        out,
        "  In stock: {} ({:.1}%)",
        summary.in_stock,
        percentage(summary.in_stock, summary.total_items)
    );
    let _ = writeln!(
        out,
        "  Out of stock: {}",
        summary.total_items.saturating_sub(summary.in_stock)
    );
    let _ = writeln!(out);

    if let (Some(min), Some(max), Some(avg)) =
        (summary.min_price, summary.max_price, summary.average_price)
    {
        let _ = writeln!(out, "Prices:");
        let _ = writeln!(out, "  Min: {:.2}", min);
        let _ = writeln!(out, "  Max: {:.2}", max);
        let _ = writeln!(out, "  Average: {:.2}", avg);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Items by Rating:");
    for rating in (0..=Rating::MAX).rev() {
        let count = summary.by_rating.get(&rating).copied().unwrap_or(0);
        let _ = writeln!(
            out,
            "  {} star{}: {} ({:.1}%)",
            rating,
            if rating == 1 { "" } else { "s" },
            count,
            percentage(count, summary.total_items)
        );
    }
    let _ = writeln!(out);

    match &stats.latest_run {
        Some(run) => {
            let _ = writeln!(out, "Latest Crawl Run:");
            let _ = writeln!(out, "  Run ID: {}", run.id);
            let _ = writeln!(out, "  Trigger: {}", run.trigger.to_db_string());
            let _ = writeln!(out, "  Status: {}", run.status.to_db_string());
            let _ = writeln!(out, "  Started: {}", run.started_at);
            if let Some(finished) = &run.finished_at {
                let _ = writeln!(out, "  Finished: {}", finished);
            }
            if let (Some(items), Some(pages)) = (run.item_count, run.pages_crawled) {
                let _ = writeln!(out, "  Crawled: {} items from {} pages", items, pages);
            }
            if let Some(error) = &run.error_message {
                let _ = writeln!(out, "  Error: {}", error);
            }
        }
        None => {
            let _ = writeln!(out, "No crawl runs recorded");
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CatalogStatistics) {
    print!("{}", format_statistics(stats));
}

fn percentage(part: u64, total: u64) -> f64 {
    if total > 0 {
        (part as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}
