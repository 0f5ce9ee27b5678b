// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Pocket Exporter
//!
//! Bulk-exports a Pocket saved-article collection: walks the server-paginated
//! collection with resumable checkpointing, extracts each article's readable
//! content, and writes the enriched records as JSON or Markdown.
//!
//! ## Features
//!
//! - **Resumable retrieval**: the offset is checkpointed after every page,
//!   and each page's records are spooled, so an interrupted run resumes
//!   without re-fetching or losing completed work
//! - **Two-tier retries**: bounded transport retries with backoff, plus a
//!   fixed-delay outer loop for connection failures with a wall-clock budget
//! - **Readable content**: a readability pass over each bookmarked page
//! - **JSON or Markdown output**: one array file, or one file per article
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            CLI                                  │
//! │   login        export        status        reset                │
//! └───────┬───────────┬─────────────────────────────────────────────┘
//!         │           │
//! ┌───────┴──┐ ┌──────┴───────────────────────────────┬─────────────┐
//! │   Auth   │ │           Pagination Driver          │   Output    │
//! ├──────────┤ ├──────────┬───────────┬───────────────┼─────────────┤
//! │ Consent  │ │   API    │   HTTP    │  Checkpoint   │ JSON        │
//! │ Redirect │ │ /v3/get  │ Retry     │  Offset file  │ Markdown    │
//! │ Token    │ │ Pages    │ Backoff   │  Item spool   │             │
//! │ cache    │ │ Totals   │ Rate limit│               │ Extraction  │
//! └──────────┘ └──────────┴───────────┴───────────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the exporter
pub mod error;

/// Common types and type aliases
pub mod types;

/// Exporter configuration
pub mod config;

/// Authorization handshake and token cache
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Checkpoint persistence
pub mod checkpoint;

/// Pocket API client
pub mod api;

/// Pagination driver
pub mod driver;

/// Article content extraction
pub mod extract;

/// JSON and Markdown output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use api::{Credential, PocketClient, SavedItem, MAX_PAGE_SIZE};
pub use checkpoint::{CheckpointStore, FileCheckpointStore, MemoryCheckpointStore};
pub use config::ExporterConfig;
pub use driver::{CancelToken, DriverConfig, ExportDriver, ExportRun};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
