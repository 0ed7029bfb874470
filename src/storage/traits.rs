//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::item::Item;
use crate::storage::{CatalogSummary, ItemFilter, ItemQuery, RunRecord, StoredItem, Trigger};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run {0} not found or already finished")]
    RunNotFound(i64),

    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines every database operation the crawl cycle and the query
/// API need.
pub trait Storage {
    // ===== Catalog =====

    /// Replaces the whole catalog with `items`
    ///
    /// Readers observe either the previous catalog or the new one, never a
    /// partially written or empty one. On error the previous catalog is kept.
    ///
    /// # Returns
    ///
    /// The number of items now stored
    fn replace_all(&mut self, items: &[Item]) -> StorageResult<usize>;

    /// Finds one page of items matching a query
    fn find_items(&self, query: &ItemQuery) -> StorageResult<Vec<StoredItem>>;

    /// Counts items matching a filter
    fn count_items(&self, filter: &ItemFilter) -> StorageResult<u64>;

    /// Gets a single item by id
    fn get_item(&self, id: i64) -> StorageResult<Option<StoredItem>>;

    /// Gets every stored item in insertion order
    fn all_items(&self) -> StorageResult<Vec<StoredItem>>;

    // ===== Run Management =====

    /// Creates a new crawl run in the running state
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, trigger: Trigger, config_hash: &str) -> StorageResult<i64>;

    /// Marks a running run as completed
    ///
    /// Fails with [`StorageError::RunNotFound`] if the run does not exist or
    /// has already finished.
    fn complete_run(&mut self, run_id: i64, item_count: u64, pages: u32) -> StorageResult<()>;

    /// Marks a running run as failed with the error that ended it
    fn fail_run(&mut self, run_id: i64, message: &str) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<Option<RunRecord>>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Fails runs left in the running state by a previous process
    ///
    /// # Returns
    ///
    /// The number of runs that were closed
    fn close_abandoned_runs(&mut self) -> StorageResult<u64>;

    // ===== Statistics =====

    /// Gets aggregate figures over the stored catalog
    fn catalog_summary(&self) -> StorageResult<CatalogSummary>;
}
