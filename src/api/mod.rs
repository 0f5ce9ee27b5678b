//! Pocket API client
//!
//! # Overview
//!
//! One form-encoded POST per page against the retrieval endpoint, given an
//! offset and a page size; returns the page's item records plus the
//! server-reported total count. Item records are opaque key-value
//! structures; the exporter only reads the handful of fields it needs for
//! bookkeeping and output.

mod client;
mod types;

pub use client::PocketClient;
pub use types::{clamp_page_size, Credential, PageRequest, PageResponse, SavedItem, MAX_PAGE_SIZE};
