//! CLI module
//!
//! Command-line interface for the exporter.
//!
//! # Commands
//!
//! - `login` - authorize and cache the access token
//! - `export` - retrieve, extract, and write the collection
//! - `status` - show checkpoint progress
//! - `reset` - discard the checkpoint

mod commands;
mod runner;

pub use commands::{Cli, Commands, ExportFormat};
pub use runner::{enrich, Runner};
