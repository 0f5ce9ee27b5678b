//! Checkpoint store implementations
//!
//! File-backed persistence with atomic writes, plus an in-memory store for
//! tests. The checkpoint file contains exactly the decimal offset; item
//! records retrieved so far are spooled to a JSON-lines sidecar so a
//! resumed run can still hand the complete collection downstream.

use crate::api::SavedItem;
use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable progress record for the pagination driver.
///
/// Injectable capability: the driver owns exactly one store per run, reads
/// it once at startup, and writes it after every successful page. At most
/// one run may use a given store location at a time.
pub trait CheckpointStore: Send {
    /// Last durably recorded offset, or 0 if no checkpoint exists or it is
    /// unreadable. Corruption is "start over from 0", never an error.
    fn read(&self) -> u64;

    /// Atomically persist the offset, replacing any prior value.
    ///
    /// A failure here is fatal for the current page: continuing with an
    /// unpersisted offset would silently break resumability.
    fn write(&mut self, offset: u64) -> Result<()>;

    /// Remove the checkpoint and the spool. Idempotent.
    fn clear(&mut self) -> Result<()>;

    /// Append one page's records to the spool.
    fn append_items(&mut self, items: &[SavedItem]) -> Result<()>;

    /// Reload all spooled records. An unreadable spool is an error; the
    /// driver treats it like an offset/spool mismatch and starts over.
    fn load_items(&self) -> Result<Vec<SavedItem>>;
}

// ============================================================================
// File-backed store
// ============================================================================

/// Checkpoint store backed by a file pair on local storage
#[derive(Debug)]
pub struct FileCheckpointStore {
    path: PathBuf,
    spool_path: PathBuf,
}

impl FileCheckpointStore {
    /// Create a store at the given checkpoint path.
    ///
    /// The spool lives next to it at `<path>.items`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let spool_path = suffixed(&path, ".items");
        Self { path, spool_path }
    }

    /// The checkpoint file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The spool file path
    pub fn spool_path(&self) -> &Path {
        &self.spool_path
    }

    /// Number of records currently spooled (0 if the spool is absent)
    pub fn spooled_count(&self) -> u64 {
        match fs::File::open(&self.spool_path) {
            Ok(file) => BufReader::new(file).lines().count() as u64,
            Err(_) => 0,
        }
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn read(&self) -> u64 {
        match fs::read_to_string(&self.path) {
            Ok(contents) => contents.trim().parse().unwrap_or(0),
            Err(_) => 0,
        }
    }

    fn write(&mut self, offset: u64) -> Result<()> {
        // Temp file + rename so a crash mid-write exposes either the old
        // value or the new one, never a torn file.
        let temp_path = suffixed(&self.path, ".tmp");
        fs::write(&temp_path, offset.to_string()).map_err(|e| {
            Error::checkpoint(format!("failed to write {}: {e}", temp_path.display()))
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| {
            Error::checkpoint(format!("failed to replace {}: {e}", self.path.display()))
        })?;
        debug!(offset, path = %self.path.display(), "checkpoint written");
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        remove_if_present(&self.path)?;
        remove_if_present(&self.spool_path)?;
        Ok(())
    }

    fn append_items(&mut self, items: &[SavedItem]) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.spool_path)
            .map_err(|e| {
                Error::checkpoint(format!("failed to open {}: {e}", self.spool_path.display()))
            })?;
        for item in items {
            let line = serde_json::to_string(item)?;
            writeln!(file, "{line}").map_err(|e| {
                Error::checkpoint(format!("failed to spool item: {e}"))
            })?;
        }
        Ok(())
    }

    fn load_items(&self) -> Result<Vec<SavedItem>> {
        let file = match fs::File::open(&self.spool_path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(Error::checkpoint(format!(
                    "failed to open {}: {e}",
                    self.spool_path.display()
                )))
            }
        };
        let mut items = Vec::new();
        for line in BufReader::new(file).lines() {
            let line =
                line.map_err(|e| Error::checkpoint(format!("failed to read spool: {e}")))?;
            if line.trim().is_empty() {
                continue;
            }
            let item: SavedItem = serde_json::from_str(&line)
                .map_err(|e| Error::checkpoint(format!("corrupt spool line: {e}")))?;
            items.push(item);
        }
        Ok(items)
    }
}

/// Append a suffix to a path without `with_extension` (the checkpoint file
/// name is dotfile-style, so extension replacement would mangle it).
fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let mut os: OsString = path.as_os_str().to_os_string();
    os.push(suffix);
    PathBuf::from(os)
}

fn remove_if_present(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::checkpoint(format!(
            "failed to remove {}: {e}",
            path.display()
        ))),
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory checkpoint store (tests, dry runs)
#[derive(Debug, Default)]
pub struct MemoryCheckpointStore {
    offset: Option<u64>,
    items: Vec<SavedItem>,
}

impl MemoryCheckpointStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with a prior run's progress
    pub fn with_progress(offset: u64, items: Vec<SavedItem>) -> Self {
        Self {
            offset: Some(offset),
            items,
        }
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn read(&self) -> u64 {
        self.offset.unwrap_or(0)
    }

    fn write(&mut self, offset: u64) -> Result<()> {
        self.offset = Some(offset);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.offset = None;
        self.items.clear();
        Ok(())
    }

    fn append_items(&mut self, items: &[SavedItem]) -> Result<()> {
        self.items.extend_from_slice(items);
        Ok(())
    }

    fn load_items(&self) -> Result<Vec<SavedItem>> {
        Ok(self.items.clone())
    }
}
