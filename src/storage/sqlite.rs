//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::item::{Item, Rating, StockStatus};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{
    CatalogSummary, ItemFilter, ItemQuery, RunRecord, RunStatus, StoredItem, Trigger,
};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;

/// Connection string selecting a private in-memory database
pub const IN_MEMORY: &str = ":memory:";

const ITEM_COLUMNS: &str = "id, title, price, stock_availability, in_stock, rating,
     detail_page_url, thumbnail_url, scraped_at";

const RUN_COLUMNS: &str = "id, triggered_by, status, started_at, finished_at, config_hash,
     item_count, pages_crawled, error_message";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Access goes through the SharedStorage mutex, so a reader never
        // observes an open replace transaction
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Opens storage from a connection string: a file path or `:memory:`
    pub fn open(connection: &str) -> StorageResult<Self> {
        if connection == IN_MEMORY {
            Self::open_in_memory()
        } else {
            Self::new(Path::new(connection))
        }
    }
}

/// Opens a database and closes any runs a previous process abandoned
pub fn init_database(connection: &str) -> StorageResult<SqliteStorage> {
    let mut storage = SqliteStorage::open(connection)?;
    let closed = storage.close_abandoned_runs()?;
    if closed > 0 {
        tracing::warn!("Marked {} abandoned crawl run(s) as failed", closed);
    }
    Ok(storage)
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn corrupt(column: usize, table: &'static str, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        Type::Text,
        Box::new(StorageError::CorruptRow { table, message }),
    )
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<StoredItem> {
    let scraped_at: String = row.get(8)?;
    let scraped_at = DateTime::parse_from_rfc3339(&scraped_at)
        .map_err(|e| corrupt(8, "items", format!("bad scraped_at {:?}: {}", scraped_at, e)))?
        .with_timezone(&Utc);

    let availability: String = row.get(3)?;
    let stock = StockStatus::from_display(&availability).ok_or_else(|| {
        corrupt(3, "items", format!("unknown stock availability {:?}", availability))
    })?;

    let rating: u8 = row.get(5)?;
    let rating = Rating::new(rating)
        .ok_or_else(|| corrupt(5, "items", format!("rating {} out of range", rating)))?;

    Ok(StoredItem {
        id: row.get(0)?,
        title: row.get(1)?,
        price: row.get(2)?,
        stock_availability: stock.as_str().to_string(),
        in_stock: stock.is_in_stock(),
        rating: rating.value(),
        detail_page_url: row.get(6)?,
        thumbnail_url: row.get(7)?,
        scraped_at,
    })
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    let trigger: String = row.get(1)?;
    let status: String = row.get(2)?;

    Ok(RunRecord {
        id: row.get(0)?,
        trigger: Trigger::from_db_string(&trigger)
            .ok_or_else(|| corrupt(1, "crawl_runs", format!("unknown trigger {:?}", trigger)))?,
        status: RunStatus::from_db_string(&status)
            .ok_or_else(|| corrupt(2, "crawl_runs", format!("unknown status {:?}", status)))?,
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        config_hash: row.get(5)?,
        item_count: row.get(6)?,
        pages_crawled: row.get(7)?,
        error_message: row.get(8)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Catalog =====

    fn replace_all(&mut self, items: &[Item]) -> StorageResult<usize> {
        // Delete and insert commit together; dropping the transaction on any
        // error rolls both back
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM items", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO items (title, price, stock_availability, in_stock, rating,
                 detail_page_url, thumbnail_url, scraped_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for item in items {
                stmt.execute(params![
                    item.title,
                    item.price,
                    item.stock_availability(),
                    item.in_stock(),
                    item.rating.value(),
                    item.detail_page_url,
                    item.thumbnail_url,
                    timestamp(item.scraped_at),
                ])?;
            }
        }
        tx.commit()?;

        Ok(items.len())
    }

    fn find_items(&self, query: &ItemQuery) -> StorageResult<Vec<StoredItem>> {
        let (where_clause, values) = query.filter.to_sql();
        let sql = format!(
            "SELECT {} FROM items{}{}",
            ITEM_COLUMNS,
            where_clause,
            query.tail_sql()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map(params_from_iter(values.iter()), item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    fn count_items(&self, filter: &ItemFilter) -> StorageResult<u64> {
        let (where_clause, values) = filter.to_sql();
        let sql = format!("SELECT COUNT(*) FROM items{}", where_clause);

        let count: u64 = self
            .conn
            .query_row(&sql, params_from_iter(values.iter()), |row| row.get(0))?;

        Ok(count)
    }

    fn get_item(&self, id: i64) -> StorageResult<Option<StoredItem>> {
        let sql = format!("SELECT {} FROM items WHERE id = ?1", ITEM_COLUMNS);
        let item = self
            .conn
            .query_row(&sql, params![id], item_from_row)
            .optional()?;
        Ok(item)
    }

    fn all_items(&self) -> StorageResult<Vec<StoredItem>> {
        let sql = format!("SELECT {} FROM items ORDER BY id ASC", ITEM_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let items = stmt
            .query_map([], item_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    // ===== Run Management =====

    fn create_run(&mut self, trigger: Trigger, config_hash: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO crawl_runs (triggered_by, status, started_at, config_hash)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                trigger.to_db_string(),
                RunStatus::Running.to_db_string(),
                timestamp(Utc::now()),
                config_hash
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64, item_count: u64, pages: u32) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2, item_count = ?3,
             pages_crawled = ?4 WHERE id = ?5 AND status = ?6",
            params![
                RunStatus::Completed.to_db_string(),
                timestamp(Utc::now()),
                item_count,
                pages,
                run_id,
                RunStatus::Running.to_db_string()
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, message: &str) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2, error_message = ?3
             WHERE id = ?4 AND status = ?5",
            params![
                RunStatus::Failed.to_db_string(),
                timestamp(Utc::now()),
                message,
                run_id,
                RunStatus::Running.to_db_string()
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM crawl_runs WHERE id = ?1", RUN_COLUMNS);
        let run = self
            .conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?;
        Ok(run)
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!(
            "SELECT {} FROM crawl_runs ORDER BY id DESC LIMIT 1",
            RUN_COLUMNS
        );
        let run = self.conn.query_row(&sql, [], run_from_row).optional()?;
        Ok(run)
    }

    fn close_abandoned_runs(&mut self) -> StorageResult<u64> {
        let closed = self.conn.execute(
            "UPDATE crawl_runs SET status = ?1, finished_at = ?2, error_message = ?3
             WHERE status = ?4",
            params![
                RunStatus::Failed.to_db_string(),
                timestamp(Utc::now()),
                "abandoned: process exited before the run finished",
                RunStatus::Running.to_db_string()
            ],
        )?;
        Ok(closed as u64)
    }

    // ===== Statistics =====

    fn catalog_summary(&self) -> StorageResult<CatalogSummary> {
        let (total_items, in_stock, min_price, max_price, average_price) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(in_stock), 0), MIN(price), MAX(price), AVG(price)
             FROM items",
            [],
            |row| {
                Ok((
                    row.get::<_, u64>(0)?,
                    row.get::<_, u64>(1)?,
                    row.get::<_, Option<f64>>(2)?,
                    row.get::<_, Option<f64>>(3)?,
                    row.get::<_, Option<f64>>(4)?,
                ))
            },
        )?;

        let mut stmt = self
            .conn
            .prepare("SELECT rating, COUNT(*) FROM items GROUP BY rating ORDER BY rating")?;
        let by_rating = stmt
            .query_map([], |row| Ok((row.get::<_, u8>(0)?, row.get::<_, u64>(1)?)))?
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(CatalogSummary {
            total_items,
            in_stock,
            min_price,
            max_price,
            average_price,
            by_rating,
        })
    }
}
