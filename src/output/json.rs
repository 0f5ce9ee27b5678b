//! JSON export
//!
//! The whole enriched collection as one pretty-printed array file.

use crate::api::SavedItem;
use crate::error::{Error, Result};
use std::path::Path;
use tracing::info;

/// Write all records to a single JSON file
pub fn write_json(items: &[SavedItem], outfile: &Path) -> Result<()> {
    let contents = serde_json::to_string_pretty(items)?;
    std::fs::write(outfile, contents)
        .map_err(|e| Error::output(format!("failed to write {}: {e}", outfile.display())))?;
    info!(records = items.len(), path = %outfile.display(), "saved JSON export");
    Ok(())
}
