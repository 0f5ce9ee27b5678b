//! Markdown export
//!
//! One file per item: front matter with the record's bookkeeping fields,
//! then the extracted article text. File names are index-prefixed so the
//! directory lists in retrieval order.

use crate::api::SavedItem;
use crate::error::{Error, Result};
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::info;

/// Longest slug kept in a file name
const MAX_SLUG_LEN: usize = 60;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Write one Markdown file per record into `outdir`
pub fn write_markdown(items: &[SavedItem], outdir: &Path) -> Result<()> {
    std::fs::create_dir_all(outdir)
        .map_err(|e| Error::output(format!("failed to create {}: {e}", outdir.display())))?;

    for (index, item) in items.iter().enumerate() {
        let name = file_name(index + 1, item);
        let path = outdir.join(&name);
        std::fs::write(&path, render(item))
            .map_err(|e| Error::output(format!("failed to write {}: {e}", path.display())))?;
    }

    info!(records = items.len(), path = %outdir.display(), "wrote Markdown export");
    Ok(())
}

/// `NNNNN_slug.md`, slug from the title with an id fallback
fn file_name(index: usize, item: &SavedItem) -> String {
    let slug = item
        .title()
        .map(|t| slugify(&t))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| format!("item-{}", item.id().unwrap_or("unknown")));
    format!("{index:05}_{slug}.md")
}

fn render(item: &SavedItem) -> String {
    let title = item.title().unwrap_or_else(|| "untitled".to_string());
    let url = item.url().unwrap_or_default();
    let tags = item.tags().join(", ");
    let word_count = item
        .word_count()
        .map(|n| n.to_string())
        .unwrap_or_default();
    let saved = item
        .time_added()
        .and_then(|ts| DateTime::from_timestamp(ts, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    let body = item.field("content_text").unwrap_or_default();

    format!(
        "---\n\
         pocket_id: {id}\n\
         url: {url}\n\
         tags: [{tags}]\n\
         word_count: {word_count}\n\
         saved: {saved}\n\
         ---\n\
         \n\
         # {title}\n\
         \n\
         {body}\n",
        id = item.id().unwrap_or_default(),
    )
}

/// Lowercased, hyphen-separated, truncated slug
pub fn slugify(input: &str) -> String {
    let lower = input.to_lowercase();
    let slug = NON_ALNUM.replace_all(&lower, "-");
    let trimmed = slug.trim_matches('-');
    let mut out = String::with_capacity(trimmed.len().min(MAX_SLUG_LEN));
    for c in trimmed.chars() {
        if out.len() + c.len_utf8() > MAX_SLUG_LEN {
            break;
        }
        out.push(c);
    }
    out.trim_end_matches('-').to_string()
}
