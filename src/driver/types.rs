//! Driver types
//!
//! Configuration, run results, and the cancellation handle.

use crate::api::SavedItem;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configuration for a retrieval run
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Items requested per page; clamped to the server cap at run start
    pub page_size: u32,
    /// Fixed delay between outer retries on connection failures
    pub stall_retry_delay: Duration,
    /// Wall-clock budget for consecutive connection failures on one page.
    ///
    /// Long bulk exports should survive a flaky network blip, but not spin
    /// silently through a real outage.
    pub max_stall: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            page_size: crate::api::MAX_PAGE_SIZE,
            stall_retry_delay: Duration::from_secs(5),
            max_stall: Duration::from_secs(15 * 60),
        }
    }
}

impl DriverConfig {
    /// Create a new driver config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the requested page size
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Set the outer retry delay
    #[must_use]
    pub fn with_stall_retry_delay(mut self, delay: Duration) -> Self {
        self.stall_retry_delay = delay;
        self
    }

    /// Set the outer retry wall-clock budget
    #[must_use]
    pub fn with_max_stall(mut self, budget: Duration) -> Self {
        self.max_stall = budget;
        self
    }
}

/// Statistics from a retrieval run
#[derive(Debug, Clone, Default)]
pub struct ExportStats {
    /// Pages fetched successfully in this run
    pub pages_fetched: usize,
    /// Items fetched in this run (excludes items restored from the spool)
    pub items_fetched: usize,
    /// Outer connection-retry passes
    pub outer_retries: usize,
    /// Offset the run resumed from (0 for a fresh run)
    pub resumed_from: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Result of a completed retrieval run
#[derive(Debug, Clone)]
pub struct ExportRun {
    /// Full accumulated collection, in retrieval order from offset 0
    pub items: Vec<SavedItem>,
    /// Run statistics
    pub stats: ExportStats,
}

/// Cancellation handle shared between the run loop and a signal handler.
///
/// Checked at least once per page iteration and inside retry waits; a
/// cancelled run keeps its checkpoint so the next run can resume.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
