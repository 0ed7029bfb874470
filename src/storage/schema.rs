//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Catalog-Sync
//! database. Item invariants are enforced by CHECK constraints so a bad row
//! fails the whole replace transaction.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- The catalog, exactly as produced by the last completed crawl
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL CHECK (length(title) > 0),
    price REAL NOT NULL CHECK (price >= 0),
    stock_availability TEXT NOT NULL
        CHECK (stock_availability IN ('In stock', 'Out of stock')),
    in_stock INTEGER NOT NULL
        CHECK (in_stock = (stock_availability = 'In stock')),
    rating INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 5),
    detail_page_url TEXT NOT NULL,
    thumbnail_url TEXT NOT NULL,
    scraped_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_items_title ON items(title);
CREATE INDEX IF NOT EXISTS idx_items_price ON items(price);
CREATE INDEX IF NOT EXISTS idx_items_rating ON items(rating);
CREATE INDEX IF NOT EXISTS idx_items_in_stock ON items(in_stock);
CREATE INDEX IF NOT EXISTS idx_items_price_rating_stock ON items(price, rating, in_stock);

-- Track crawl runs
CREATE TABLE IF NOT EXISTS crawl_runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    triggered_by TEXT NOT NULL,
    status TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    item_count INTEGER,
    pages_crawled INTEGER,
    error_message TEXT
);

CREATE INDEX IF NOT EXISTS idx_crawl_runs_status ON crawl_runs(status);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
