//! Crawl cycles
//!
//! A crawl cycle is one full crawl followed by one catalog replace. Every
//! trigger (startup, schedule, manual refresh) goes through [`CycleRunner`],
//! which allows a single cycle at a time and records each one in the
//! crawl-run ledger.

mod runner;

pub use crate::storage::Trigger;
pub use runner::{CycleRunner, TriggerOutcome};

use crate::item::Item;

/// Outcome of a successful crawl cycle
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// Ledger id of the run
    pub run_id: i64,

    pub trigger: Trigger,

    /// The new catalog, in crawl order
    pub items: Vec<Item>,

    /// Number of listing pages fetched
    pub pages: u32,

    /// Number of items written by the replace
    pub stored: usize,
}
