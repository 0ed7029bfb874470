use crate::crawler::{CrawlResult, Crawler};
use crate::storage::{self, SharedStorage, Storage};
use crate::sync::{CycleReport, Trigger};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::OwnedMutexGuard;

/// Result of asking for a cycle without waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A new cycle was started in the background
    Started { run_id: i64 },

    /// A cycle was already running; the request was folded into it
    ///
    /// `run_id` is `None` only in the instant between the running cycle taking
    /// the slot and recording its ledger entry.
    AlreadyRunning { run_id: Option<i64> },
}

/// Runs crawl cycles one at a time
///
/// Cloning is cheap; clones share the slot, so a cycle started through one
/// clone blocks the others.
#[derive(Clone)]
pub struct CycleRunner {
    inner: Arc<RunnerInner>,
}

struct RunnerInner {
    crawler: Crawler,
    storage: SharedStorage,
    config_hash: String,
    slot: Arc<tokio::sync::Mutex<()>>,
    active_run: Mutex<Option<i64>>,
}

impl CycleRunner {
    pub fn new(crawler: Crawler, storage: SharedStorage, config_hash: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                crawler,
                storage,
                config_hash: config_hash.into(),
                slot: Arc::new(tokio::sync::Mutex::new(())),
                active_run: Mutex::new(None),
            }),
        }
    }

    pub fn storage(&self) -> &SharedStorage {
        &self.inner.storage
    }

    /// Ledger id of the cycle currently running, if any
    pub fn active_run(&self) -> Option<i64> {
        self.inner
            .active_run
            .lock()
            .map(|active| *active)
            .unwrap_or(None)
    }

    /// Runs a full cycle and waits for it
    ///
    /// If another cycle holds the slot this waits for it to finish first.
    ///
    /// # Returns
    ///
    /// * `Ok(CycleReport)` - The catalog was replaced with the new crawl
    /// * `Err(CatalogError)` - The cycle failed; the stored catalog is unchanged
    pub async fn run_now(&self, trigger: Trigger) -> crate::Result<CycleReport> {
        let guard = self.inner.slot.clone().lock_owned().await;
        let run_id = self.begin(trigger)?;
        self.execute(run_id, trigger, guard).await
    }

    /// Starts a cycle in the background unless one is already running
    ///
    /// Returns as soon as the run is recorded in the ledger. The outcome of
    /// the cycle is observable through the run record and the logs.
    pub fn try_start(&self, trigger: Trigger) -> crate::Result<TriggerOutcome> {
        let guard = match self.inner.slot.clone().try_lock_owned() {
            Ok(guard) => guard,
            Err(_) => {
                return Ok(TriggerOutcome::AlreadyRunning {
                    run_id: self.active_run(),
                })
            }
        };

        let run_id = self.begin(trigger)?;
        let runner = self.clone();
        tokio::spawn(async move {
            // Failures are already logged and recorded on the run by execute
            let _ = runner.execute(run_id, trigger, guard).await;
        });

        Ok(TriggerOutcome::Started { run_id })
    }

    fn begin(&self, trigger: Trigger) -> crate::Result<i64> {
        let run_id = storage::lock(&self.inner.storage)?.create_run(trigger, &self.inner.config_hash)?;
        self.set_active(Some(run_id));
        tracing::info!("Crawl run {} started ({:?} trigger)", run_id, trigger);
        Ok(run_id)
    }

    async fn execute(
        &self,
        run_id: i64,
        trigger: Trigger,
        _slot: OwnedMutexGuard<()>,
    ) -> crate::Result<CycleReport> {
        let start_time = Instant::now();
        let result = self.crawl_and_replace().await;
        self.set_active(None);

        match result {
            Ok((crawl, stored)) => {
                // The catalog is already replaced; a ledger failure must not
                // turn the cycle into a failure
                let recorded = storage::lock(&self.inner.storage).and_then(|mut storage| {
                    storage.complete_run(run_id, stored as u64, crawl.pages)
                });
                if let Err(record_err) = recorded {
                    tracing::warn!(
                        "Catalog replaced but run {} could not be marked completed: {}",
                        run_id,
                        record_err
                    );
                }
                tracing::info!(
                    "Crawl run {} completed: {} items from {} pages stored in {:?}",
                    run_id,
                    stored,
                    crawl.pages,
                    start_time.elapsed()
                );
                Ok(CycleReport {
                    run_id,
                    trigger,
                    items: crawl.items,
                    pages: crawl.pages,
                    stored,
                })
            }
            Err(e) => {
                tracing::error!("Crawl run {} failed: {}", run_id, e);
                let recorded = storage::lock(&self.inner.storage)
                    .and_then(|mut storage| storage.fail_run(run_id, &e.to_string()));
                if let Err(record_err) = recorded {
                    tracing::warn!("Could not record failure of run {}: {}", run_id, record_err);
                }
                Err(e)
            }
        }
    }

    async fn crawl_and_replace(&self) -> crate::Result<(CrawlResult, usize)> {
        let crawl = self.inner.crawler.crawl().await?;
        let stored = storage::lock(&self.inner.storage)?.replace_all(&crawl.items)?;
        Ok((crawl, stored))
    }

    fn set_active(&self, run_id: Option<i64>) {
        if let Ok(mut active) = self.inner.active_run.lock() {
            *active = run_id;
        }
    }
}
