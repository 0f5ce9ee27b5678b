//! Pagination driver
//!
//! Owns the fetch loop: requests successive pages, advances and persists
//! the offset after each successful page, detects completion, and hands
//! the full accumulated collection downstream.
//!
//! # Overview
//!
//! Pages are fetched strictly sequentially: the next offset is only known
//! once the current page's item count is known. After every successful
//! page the items are spooled and the new offset checkpointed, so a crash
//! or interruption resumes without re-fetching completed pages. On clean
//! completion the checkpoint is cleared.
//!
//! Failure handling is two-tier: the HTTP layer retries transient
//! failures with bounded backoff, and this driver additionally retries
//! connection-level failures at a fixed delay under a wall-clock budget.
//! Anything else is fatal and leaves the checkpoint at the last completed
//! offset.

mod types;

pub use types::{CancelToken, DriverConfig, ExportRun, ExportStats};

use crate::api::{clamp_page_size, PageRequest, PageResponse, PocketClient, SavedItem};
use crate::checkpoint::CheckpointStore;
use crate::error::{Error, Result};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Drives the paged retrieval of the full collection
pub struct ExportDriver<S: CheckpointStore> {
    api: PocketClient,
    store: S,
    config: DriverConfig,
}

impl<S: CheckpointStore> ExportDriver<S> {
    /// Create a driver over an API client and a checkpoint store
    pub fn new(api: PocketClient, store: S, config: DriverConfig) -> Self {
        Self { api, store, config }
    }

    /// Borrow the checkpoint store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Retrieve the complete collection, resuming from the checkpoint.
    ///
    /// On success the checkpoint is cleared and every item from offset 0
    /// is returned, including items restored from a prior interrupted
    /// run's spool. On error or cancellation the checkpoint stays at the
    /// last successfully completed offset.
    pub async fn run(&mut self, cancel: &CancelToken) -> Result<ExportRun> {
        let started = Instant::now();
        let mut stats = ExportStats::default();

        let (page_size, clamped) = clamp_page_size(self.config.page_size);
        if clamped {
            warn!(
                requested = self.config.page_size,
                effective = page_size,
                "page size exceeds the server cap, clamping"
            );
        }

        let (mut offset, mut items) = self.restore_progress(&mut stats)?;
        let mut last_total: Option<u64> = None;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let request = PageRequest::new(offset, page_size);
            let page = self.fetch_with_stall_retry(request, cancel, &mut stats).await?;
            stats.pages_fetched += 1;

            let fetched = page.items.len();
            if fetched == 0 {
                // Empty page is the primary completion signal, regardless
                // of what the advisory total claims.
                break;
            }

            // A short page advances by what actually arrived, not by the
            // page size; the spool is written before the offset so the
            // checkpoint never points past the persisted items.
            offset += fetched as u64;
            stats.items_fetched += fetched;
            self.store.append_items(&page.items)?;
            self.store.write(offset)?;
            items.extend(page.items);

            info!(offset, fetched, total = ?page.total, "page retrieved");

            if let Some(total) = page.total {
                last_total = Some(total);
                if offset >= total {
                    break;
                }
            }
        }

        if let Err(e) = self.store.clear() {
            // A stale checkpoint only causes a harmless instant-complete
            // resume on the next run.
            warn!("failed to remove checkpoint: {e}");
        }

        stats.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            items = items.len(),
            pages = stats.pages_fetched,
            total = ?last_total,
            "retrieval complete"
        );

        Ok(ExportRun { items, stats })
    }

    /// Read the checkpoint and restore spooled items from a prior run.
    ///
    /// The spool must account for exactly `offset` items; any disagreement
    /// (torn run, manual tampering, unreadable spool) restarts from 0
    /// rather than returning a collection with a hole in it.
    fn restore_progress(&mut self, stats: &mut ExportStats) -> Result<(u64, Vec<SavedItem>)> {
        let offset = self.store.read();
        if offset == 0 {
            return Ok((0, Vec::new()));
        }

        match self.store.load_items() {
            Ok(spooled) if spooled.len() as u64 == offset => {
                info!(offset, "resuming from checkpoint");
                stats.resumed_from = offset;
                Ok((offset, spooled))
            }
            Ok(spooled) => {
                warn!(
                    offset,
                    spooled = spooled.len(),
                    "checkpoint and spool disagree, starting over"
                );
                self.store.clear()?;
                Ok((0, Vec::new()))
            }
            Err(e) => {
                warn!(offset, "unreadable spool ({e}), starting over");
                self.store.clear()?;
                Ok((0, Vec::new()))
            }
        }
    }

    /// Fetch one page, absorbing connection-level failures.
    ///
    /// Transport retries (bounded, backoff) happen inside the HTTP layer.
    /// If the connection itself keeps failing past that budget, wait a
    /// fixed short delay and try again (bulk exports must not abort on a
    /// network blip), giving up once the wall-clock budget is spent.
    /// Status-level and parse failures propagate immediately.
    async fn fetch_with_stall_retry(
        &self,
        request: PageRequest,
        cancel: &CancelToken,
        stats: &mut ExportStats,
    ) -> Result<PageResponse> {
        let mut stalled = Duration::ZERO;
        loop {
            match self.api.fetch_page(request).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_connection() => {
                    if stalled >= self.config.max_stall {
                        return Err(Error::ConnectionStalled {
                            waited_secs: stalled.as_secs(),
                        });
                    }
                    warn!(
                        offset = request.offset,
                        "network hiccup ({e}), retrying in {:?}",
                        self.config.stall_retry_delay
                    );
                    stats.outer_retries += 1;
                    if sleep_cancellable(self.config.stall_retry_delay, cancel).await {
                        return Err(Error::Cancelled);
                    }
                    stalled += self.config.stall_retry_delay;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Sleep in short ticks so cancellation is observed promptly.
///
/// Returns true if cancellation was requested during the wait.
async fn sleep_cancellable(duration: Duration, cancel: &CancelToken) -> bool {
    let tick = Duration::from_millis(100);
    let mut waited = Duration::ZERO;
    while waited < duration {
        if cancel.is_cancelled() {
            return true;
        }
        let step = tick.min(duration - waited);
        tokio::time::sleep(step).await;
        waited += step;
    }
    cancel.is_cancelled()
}

#[cfg(test)]
mod tests;
