//! Checkpoint persistence
//!
//! Durable progress record enabling a later run to resume without redoing
//! completed pages.
//!
//! # Overview
//!
//! The checkpoint module provides:
//! - `CheckpointStore` - the injectable persistence contract
//! - `FileCheckpointStore` - offset file + item spool with atomic writes
//! - `MemoryCheckpointStore` - for tests

mod store;

pub use store::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
