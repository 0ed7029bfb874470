//! Integration tests for the query API
//!
//! Requests go straight to the router with `tower::ServiceExt::oneshot`; no
//! socket is bound.

use crate::fixtures::*;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use catalog_sync::api::{router, AppState};
use catalog_sync::item::{Item, Rating, StockStatus};
use catalog_sync::CycleRunner;
use chrono::Utc;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::MockServer;

fn book(title: &str, price: f64, rating: &str, stock: StockStatus) -> Item {
    let slug = title.to_lowercase().replace(' ', "-");
    Item {
        title: title.to_string(),
        price,
        stock,
        rating: Rating::from_word(rating),
        detail_page_url: format!("https://books.toscrape.com/catalogue/{}/index.html", slug),
        thumbnail_url: format!("https://books.toscrape.com/media/{}.jpg", slug),
        scraped_at: Utc::now(),
    }
}

fn shelf() -> Vec<Item> {
    vec![
        book("A Light in the Attic", 51.77, "Three", StockStatus::InStock),
        book("Tipping the Velvet", 53.74, "One", StockStatus::InStock),
        book("Soumission", 50.10, "One", StockStatus::OutOfStock),
        book("Sharp Objects", 47.82, "Four", StockStatus::InStock),
        book("Sapiens", 54.23, "Five", StockStatus::InStock),
        book("The Requiem Red", 22.65, "One", StockStatus::OutOfStock),
        book("The Dirty Little Secrets", 33.34, "Four", StockStatus::InStock),
        book("The Coming Woman", 17.93, "Three", StockStatus::InStock),
        book("The Boys in the Boat", 22.60, "Four", StockStatus::InStock),
        book("The Black Maria", 52.15, "One", StockStatus::InStock),
        book("Starving Hearts", 13.99, "Two", StockStatus::OutOfStock),
        book("Shakespeare's Sonnets", 20.66, "Four", StockStatus::InStock),
        book("Set Me Free", 17.46, "Five", StockStatus::InStock),
        book("Scott Pilgrim", 52.29, "Five", StockStatus::InStock),
        book("Rip it Up", 35.02, "Five", StockStatus::InStock),
    ]
}

async fn app_with_shelf(server: &MockServer) -> (Router, CycleRunner) {
    let runner = runner_for(server, 50);
    seed(&runner, &shelf());
    (router(AppState::new(runner.clone())), runner)
}

async fn send(app: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn titles(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect()
}

async fn wait_for_run(app: &Router, job_id: i64) -> Value {
    for _ in 0..100 {
        let (status, body) = send(app, "GET", &format!("/api/refresh/{}", job_id)).await;
        assert_eq!(status, StatusCode::OK);
        if body["status"] != "running" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("refresh {} never finished", job_id);
}

#[tokio::test]
async fn test_healthz() {
    let server = MockServer::start().await;
    let (app, _runner) = app_with_shelf(&server).await;
    let (status, _) = send(&app, "GET", "/healthz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_items_defaults() {
    let server = MockServer::start().await;
    let (app, _runner) = app_with_shelf(&server).await;

    let (status, body) = send(&app, "GET", "/api/items").await;
    assert_eq!(status, StatusCode::OK);

    let items = titles(&body);
    assert_eq!(items.len(), 12);
    // Sorted by title ascending
    assert_eq!(items[0], "A Light in the Attic");
    assert_eq!(items[1], "Rip it Up");

    let pagination = &body["pagination"];
    assert_eq!(pagination["currentPage"], 1);
    assert_eq!(pagination["totalPages"], 2);
    assert_eq!(pagination["totalItems"], 15);
    assert_eq!(pagination["itemsPerPage"], 12);
    assert_eq!(pagination["hasNextPage"], true);
    assert_eq!(pagination["hasPrevPage"], false);

    let first = &body["items"][0];
    assert!(first["id"].is_i64());
    assert_eq!(first["price"], 51.77);
    assert_eq!(first["stockAvailability"], "In stock");
    assert_eq!(first["inStock"], true);
    assert_eq!(first["rating"], 3);
    assert_eq!(
        first["detailPageUrl"],
        "https://books.toscrape.com/catalogue/a-light-in-the-attic/index.html"
    );
    assert!(first["thumbnailUrl"].is_string());
    assert!(first["scrapedAt"].is_string());
}

#[tokio::test]
async fn test_list_items_second_page() {
    let server = MockServer::start().await;
    let (app, _runner) = app_with_shelf(&server).await;

    let (status, body) = send(&app, "GET", "/api/items?page=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body).len(), 3);
    assert_eq!(body["pagination"]["hasNextPage"], false);
    assert_eq!(body["pagination"]["hasPrevPage"], true);
}

#[tokio::test]
async fn test_list_items_filters_and_sort() {
    let server = MockServer::start().await;
    let (app, _runner) = app_with_shelf(&server).await;

    let (status, body) = send(
        &app,
        "GET",
        "/api/items?minRating=4&inStock=true&minPrice=20&sortBy=price&sortOrder=desc",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        titles(&body),
        vec![
            "Sapiens",
            "Scott Pilgrim",
            "Sharp Objects",
            "Rip it Up",
            "The Dirty Little Secrets",
            "The Boys in the Boat",
            "Shakespeare's Sonnets",
        ]
    );
    assert_eq!(body["pagination"]["totalItems"], 7);
}

#[tokio::test]
async fn test_list_items_out_of_stock_and_price_ceiling() {
    let server = MockServer::start().await;
    let (app, _runner) = app_with_shelf(&server).await;

    let (_, body) = send(&app, "GET", "/api/items?inStock=false&maxPrice=30&sortBy=price").await;
    assert_eq!(titles(&body), vec!["Starving Hearts", "The Requiem Red"]);
}

#[tokio::test]
async fn test_search_is_case_insensitive() {
    let server = MockServer::start().await;
    let (app, _runner) = app_with_shelf(&server).await;

    let (status, body) = send(&app, "GET", "/api/items?search=THE%20B").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["The Black Maria", "The Boys in the Boat"]);
}

#[tokio::test]
async fn test_invalid_parameters_are_rejected() {
    let server = MockServer::start().await;
    let (app, _runner) = app_with_shelf(&server).await;

    for uri in [
        "/api/items?page=0",
        "/api/items?limit=500",
        "/api/items?minRating=9",
        "/api/items?minPrice=cheap",
        "/api/items?inStock=maybe",
        "/api/items?sortBy=id",
        "/api/items?sortOrder=sideways",
    ] {
        let (status, body) = send(&app, "GET", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body["error"].is_string(), "{}", uri);
    }
}

#[tokio::test]
async fn test_get_item() {
    let server = MockServer::start().await;
    let (app, _runner) = app_with_shelf(&server).await;

    let (_, list) = send(&app, "GET", "/api/items?search=sapiens").await;
    let id = list["items"][0]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/items/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Sapiens");
    assert_eq!(body["rating"], 5);

    let (status, body) = send(&app, "GET", "/api/items/999999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Item not found");

    let (status, _) = send(&app, "GET", "/api/items/not-an-id").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_refresh_replaces_catalog() {
    let server = MockServer::start().await;
    mount_catalog(&server, &[20, 5]).await;
    let (app, _runner) = app_with_shelf(&server).await;

    let (status, body) = send(&app, "POST", "/api/refresh").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "running");
    assert_eq!(body["coalesced"], false);
    let job_id = body["jobId"].as_i64().unwrap();

    let run = wait_for_run(&app, job_id).await;
    assert_eq!(run["status"], "completed");
    assert_eq!(run["trigger"], "manual");
    assert_eq!(run["itemCount"], 25);
    assert_eq!(run["pagesCrawled"], 2);
    assert!(run["finishedAt"].is_string());

    let (_, list) = send(&app, "GET", "/api/items?limit=100").await;
    assert_eq!(list["pagination"]["totalItems"], 25);
    assert!(titles(&list).iter().all(|t| t.starts_with("Book ")));
}

#[tokio::test]
async fn test_failed_refresh_is_reported() {
    let server = MockServer::start().await;
    mount_page(&server, 1, listing_page(1, 0, 20, true)).await;
    mount_status(&server, 2, 503).await;
    let (app, _runner) = app_with_shelf(&server).await;

    let (_, body) = send(&app, "POST", "/api/refresh").await;
    let job_id = body["jobId"].as_i64().unwrap();

    let run = wait_for_run(&app, job_id).await;
    assert_eq!(run["status"], "failed");
    assert!(run["errorMessage"].as_str().unwrap().contains("503"));

    // The previous catalog is still served
    let (_, list) = send(&app, "GET", "/api/items").await;
    assert_eq!(list["pagination"]["totalItems"], 15);
}

#[tokio::test]
async fn test_concurrent_refresh_is_coalesced() {
    let server = MockServer::start().await;
    mount_slow_page(&server, 1, listing_page(1, 0, 3, false), Duration::from_millis(300)).await;
    let (app, runner) = app_with_shelf(&server).await;

    let (status, first) = send(&app, "POST", "/api/refresh").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let job_id = first["jobId"].as_i64().unwrap();
    assert_eq!(runner.active_run(), Some(job_id));

    let (status, second) = send(&app, "POST", "/api/refresh").await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(second["coalesced"], true);
    assert_eq!(second["jobId"], job_id);

    let run = wait_for_run(&app, job_id).await;
    assert_eq!(run["status"], "completed");
    assert_eq!(run["itemCount"], 3);
}

#[tokio::test]
async fn test_unknown_refresh_job() {
    let server = MockServer::start().await;
    let (app, _runner) = app_with_shelf(&server).await;

    let (status, body) = send(&app, "GET", "/api/refresh/4242").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Refresh job not found");
}
