//! Integration tests for the crawl cycle
//!
//! These tests drive full crawl cycles against a mock listing site and check
//! what ends up in the store.

use crate::fixtures::*;
use catalog_sync::crawler::{Crawler, PageFetcher};
use catalog_sync::storage::{self, ItemFilter, RunStatus, SqliteStorage, Storage, StoredItem};
use catalog_sync::{CatalogError, CrawlError, ExtractionError, FetchError, Trigger};
use wiremock::MockServer;

fn stored(runner: &catalog_sync::CycleRunner) -> Vec<StoredItem> {
    storage::lock(runner.storage()).unwrap().all_items().unwrap()
}

/// Listing fields of a stored item, without id and timestamp
fn listing(item: &StoredItem) -> (String, String, String, bool, u8, String, String) {
    (
        item.title.clone(),
        format!("{:.2}", item.price),
        item.stock_availability.clone(),
        item.in_stock,
        item.rating,
        item.detail_page_url.clone(),
        item.thumbnail_url.clone(),
    )
}

#[tokio::test]
async fn test_two_page_crawl_replaces_store() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[20, 5]).await;

    let runner = runner_for(&server, 50);
    seed(&runner, &stale_items(7));

    let report = runner.run_now(Trigger::Startup).await.unwrap();
    assert_eq!(report.items.len(), 25);
    assert_eq!(report.pages, 2);
    assert_eq!(report.stored, 25);

    // Page 1 items come first, in document order
    let titles: Vec<_> = report.items.iter().map(|i| i.title.clone()).collect();
    let expected: Vec<_> = (0..25).map(title_for).collect();
    assert_eq!(titles, expected);

    let items = stored(&runner);
    assert_eq!(items.len(), 25);
    assert!(items.iter().all(|i| !i.title.starts_with("Stale")));
}

#[tokio::test]
async fn test_crawled_fields_are_normalized() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[20, 5]).await;
    let base = server.uri();

    let runner = runner_for(&server, 50);
    let report = runner.run_now(Trigger::Startup).await.unwrap();

    let first = &report.items[0];
    assert_eq!(first.title, "Book 000");
    assert!((first.price - 10.99).abs() < 1e-9);
    assert_eq!(first.rating.value(), 1);
    assert!(first.in_stock());
    assert_eq!(
        first.detail_page_url,
        format!("{}/catalogue/book-0_0/index.html", base)
    );
    assert_eq!(
        first.thumbnail_url,
        format!("{}/media/cache/00/book-0.jpg", base)
    );

    // Page 2 links are relative to catalogue/
    let later = &report.items[23];
    assert_eq!(later.title, "Book 023");
    assert_eq!(later.stock_availability(), "Out of stock");
    assert!(!later.in_stock());
    assert_eq!(
        later.detail_page_url,
        format!("{}/catalogue/book-23_23/index.html", base)
    );
    assert_eq!(
        later.thumbnail_url,
        format!("{}/media/cache/23/book-23.jpg", base)
    );

    for item in &report.items {
        assert!(item.rating.value() <= 5);
        assert_eq!(item.in_stock(), item.stock_availability() == "In stock");
    }
}

#[tokio::test]
async fn test_single_page_without_next_stops() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[3]).await;
    // A second page exists but must not be requested
    mount_status(&server, 2, 500).await;

    let runner = runner_for(&server, 50);
    let report = runner.run_now(Trigger::Startup).await.unwrap();
    assert_eq!(report.pages, 1);
    assert_eq!(report.items.len(), 3);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.path(), "/index.html");
}

#[tokio::test]
async fn test_failed_page_keeps_previous_catalog() {
    let server = MockServer::start().await;
    mount_page(&server, 1, listing_page(1, 0, 20, true)).await;
    mount_status(&server, 2, 500).await;

    let runner = runner_for(&server, 50);
    seed(&runner, &stale_items(4));

    let err = runner.run_now(Trigger::Scheduled).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Fetch(FetchError::Status { status: 500, .. })
    ));

    // No partial write of page 1
    let items = stored(&runner);
    assert_eq!(items.len(), 4);
    assert!(items.iter().all(|i| i.title.starts_with("Stale")));

    let run = storage::lock(runner.storage())
        .unwrap()
        .get_latest_run()
        .unwrap()
        .unwrap();
    assert_eq!(run.status, RunStatus::Failed);
    assert_eq!(run.trigger, Trigger::Scheduled);
    assert!(run.error_message.unwrap().contains("500"));
}

#[tokio::test]
async fn test_extraction_failure_aborts_crawl() {
    let server = MockServer::start().await;
    mount_page(&server, 1, listing_page(1, 0, 20, true)).await;
    let broken = listing_page(2, 20, 5, false).replace(r#"<p class="price_color">"#, r#"<p class="price">"#);
    mount_page(&server, 2, broken).await;

    let runner = runner_for(&server, 50);
    seed(&runner, &stale_items(2));

    let err = runner.run_now(Trigger::Manual).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Extraction(ExtractionError::MissingField { page: 2, .. })
    ));
    assert_eq!(stored(&runner).len(), 2);
}

#[tokio::test]
async fn test_repeat_crawl_is_idempotent() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[20, 5]).await;

    let runner = runner_for(&server, 50);
    let first_report = runner.run_now(Trigger::Startup).await.unwrap();
    let first: Vec<_> = stored(&runner).iter().map(listing).collect();

    let second_report = runner.run_now(Trigger::Manual).await.unwrap();
    let second: Vec<_> = stored(&runner).iter().map(listing).collect();

    assert_eq!(first_report.items.len(), 25);
    assert_eq!(second_report.items.len(), 25);
    assert!(first_report
        .items
        .iter()
        .zip(&second_report.items)
        .all(|(a, b)| a.same_listing(b)));

    assert_eq!(first.len(), 25);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_repeated_page_is_detected() {
    let server = MockServer::start().await;
    // Page 3 serves page 2's items and keeps pointing onward
    mount_page(&server, 1, listing_page(1, 0, 20, true)).await;
    mount_page(&server, 2, listing_page(2, 20, 20, true)).await;
    mount_page(&server, 3, listing_page(3, 20, 20, true)).await;

    let runner = runner_for(&server, 50);
    let err = runner.run_now(Trigger::Startup).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Crawl(CrawlError::PageLoop {
            page: 3,
            duplicate_of: 2
        })
    ));
    assert_eq!(stored(&runner).len(), 0);
}

#[tokio::test]
async fn test_page_limit_aborts_crawl() {
    let server = MockServer::start().await;
    for page in 1..=3 {
        mount_page(&server, page, listing_page(page, (page as usize - 1) * 2, 2, true)).await;
    }

    let runner = runner_for(&server, 3);
    seed(&runner, &stale_items(1));

    let err = runner.run_now(Trigger::Startup).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Crawl(CrawlError::PageLimit { max_pages: 3 })
    ));
    assert_eq!(stored(&runner).len(), 1);
}

#[tokio::test]
async fn test_crawler_from_config() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[2, 2, 1]).await;

    let config = catalog_sync::config::SourceConfig {
        base_url: format!("{}/", server.uri()),
        ..Default::default()
    };
    let crawler = Crawler::new(&config).unwrap();
    let result = crawler.crawl().await.unwrap();
    assert_eq!(result.pages, 3);
    assert_eq!(result.items.len(), 5);
    assert!(result.items[4]
        .detail_page_url
        .starts_with(&format!("{}/catalogue/", server.uri())));
}

#[tokio::test]
async fn test_crawl_into_file_database() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[4]).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("catalog.db");
    let connection = db_path.to_string_lossy().to_string();

    let fetcher = PageFetcher::with_client(reqwest::Client::new(), &server.uri());
    let runner = catalog_sync::CycleRunner::new(
        Crawler::with_fetcher(fetcher, 10),
        storage::share(storage::init_database(&connection).unwrap()),
        "test-hash",
    );
    runner.run_now(Trigger::Startup).await.unwrap();
    drop(runner);

    // A new process sees the stored catalog
    let reopened = SqliteStorage::open(&connection).unwrap();
    assert_eq!(reopened.count_items(&ItemFilter::default()).unwrap(), 4);
    let run = reopened.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.item_count, Some(4));
    assert_eq!(run.pages_crawled, Some(1));
}
