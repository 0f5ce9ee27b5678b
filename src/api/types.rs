//! Request and response types for the collection endpoint
//!
//! The item records themselves are opaque: the exporter never interprets
//! their fields beyond a handful of accessors used for bookkeeping, error
//! reporting, and the output step.

use crate::types::{JsonObject, JsonValue, OptionStringExt};
use serde::{Deserialize, Serialize};

/// Hard per-call item cap documented by the Pocket API
pub const MAX_PAGE_SIZE: u32 = 30;

/// Retrieval endpoint path
pub(crate) const RETRIEVE_PATH: &str = "/v3/get";

// ============================================================================
// Credential
// ============================================================================

/// Opaque credential pair sent with every page request
#[derive(Debug, Clone)]
pub struct Credential {
    /// Application consumer key
    pub consumer_key: String,
    /// User access token from the authorization handshake
    pub access_token: String,
}

impl Credential {
    /// Create a new credential
    pub fn new(consumer_key: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            access_token: access_token.into(),
        }
    }
}

// ============================================================================
// Page Request
// ============================================================================

/// One page request: immutable per call.
///
/// The state/detail/sort fields are fixed: the exporter always walks the
/// complete collection, newest first, with full item detail and the total
/// count requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Number of items already accounted for; start of this page
    pub offset: u64,
    /// Items requested for this page (must already be within the cap)
    pub page_size: u32,
}

impl PageRequest {
    /// Create a page request
    pub fn new(offset: u64, page_size: u32) -> Self {
        debug_assert!(page_size >= 1 && page_size <= MAX_PAGE_SIZE);
        Self { offset, page_size }
    }
}

/// Clamp a requested page size to the server's documented cap.
///
/// Returns the effective size and whether clamping occurred, so the caller
/// can warn exactly once rather than per page.
pub fn clamp_page_size(requested: u32) -> (u32, bool) {
    if requested > MAX_PAGE_SIZE {
        (MAX_PAGE_SIZE, true)
    } else if requested == 0 {
        (1, true)
    } else {
        (requested, false)
    }
}

// ============================================================================
// Page Response
// ============================================================================

/// One page of retrieved items plus the server's advisory total
#[derive(Debug, Clone, Default)]
pub struct PageResponse {
    /// Items in the order the server returned them
    pub items: Vec<SavedItem>,
    /// Server-reported total collection size as of this call.
    ///
    /// Advisory only: it may change between calls if the remote collection
    /// is mutated concurrently. Used for early termination, never as a
    /// hard invariant.
    pub total: Option<u64>,
}

/// Raw wire shape of a retrieval response.
///
/// Pocket encodes the page as an id -> record map (insertion-ordered) but
/// sends `[]` or `{}` when the page is empty, and `total` arrives as either
/// a number or a decimal string.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPage {
    #[serde(default)]
    list: RawList,
    #[serde(default)]
    total: Option<RawTotal>,
}

impl RawPage {
    /// Flatten the wire shape into the page response
    pub(crate) fn into_page(self) -> PageResponse {
        let items = match self.list {
            RawList::Map(map) => map
                .into_iter()
                .filter_map(|(_, value)| match value {
                    JsonValue::Object(obj) => Some(SavedItem(obj)),
                    _ => None,
                })
                .collect(),
            RawList::Seq(_) => Vec::new(),
        };
        PageResponse {
            items,
            total: self.total.and_then(|t| t.as_u64()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawList {
    Map(JsonObject),
    // Empty pages arrive as "list": []
    Seq(Vec<JsonValue>),
}

impl Default for RawList {
    fn default() -> Self {
        Self::Seq(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawTotal {
    Num(u64),
    Str(String),
}

impl RawTotal {
    fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Num(n) => Some(*n),
            Self::Str(s) => s.trim().parse().ok(),
        }
    }
}

// ============================================================================
// Saved Item
// ============================================================================

/// One saved-article record, kept opaque.
///
/// Added once to the accumulated collection and never mutated by the
/// retrieval core; the enrichment pass merges extracted content in before
/// output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedItem(pub(crate) JsonObject);

impl SavedItem {
    /// Wrap a raw record object
    pub fn new(record: JsonObject) -> Self {
        Self(record)
    }

    /// Stable identifier used for bookkeeping and error reporting
    pub fn id(&self) -> Option<&str> {
        self.str_field("item_id")
    }

    /// URL the item was saved with
    pub fn given_url(&self) -> Option<String> {
        self.string_field("given_url")
    }

    /// URL the service resolved the item to
    pub fn resolved_url(&self) -> Option<String> {
        self.string_field("resolved_url")
    }

    /// Best available URL: resolved, falling back to given
    pub fn url(&self) -> Option<String> {
        self.resolved_url().or_else(|| self.given_url())
    }

    /// Best available title: resolved, falling back to given
    pub fn title(&self) -> Option<String> {
        self.string_field("resolved_title")
            .or_else(|| self.string_field("given_title"))
    }

    /// Tag names attached to the item
    pub fn tags(&self) -> Vec<String> {
        match self.0.get("tags") {
            Some(JsonValue::Object(tags)) => tags.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Word count the service reports for the resolved article
    pub fn word_count(&self) -> Option<u64> {
        self.u64_field("word_count")
    }

    /// Unix timestamp the item was saved at
    pub fn time_added(&self) -> Option<i64> {
        match self.0.get("time_added") {
            Some(JsonValue::String(s)) => s.parse().ok(),
            Some(JsonValue::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    /// Merge a field into the record (used by the enrichment pass)
    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) {
        self.0.insert(key.into(), value);
    }

    /// Read a string field by name
    pub fn field(&self, key: &str) -> Option<&str> {
        self.str_field(key)
    }

    /// Borrow the underlying record object
    pub fn as_object(&self) -> &JsonObject {
        &self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(JsonValue::as_str)
    }

    /// String field with empty values collapsed to None
    fn string_field(&self, key: &str) -> Option<String> {
        self.str_field(key).map(ToString::to_string).none_if_empty()
    }

    /// Numeric field that may arrive as a number or a decimal string
    fn u64_field(&self, key: &str) -> Option<u64> {
        match self.0.get(key) {
            Some(JsonValue::String(s)) => s.parse().ok(),
            Some(JsonValue::Number(n)) => n.as_u64(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: serde_json::Value) -> SavedItem {
        match value {
            JsonValue::Object(obj) => SavedItem::new(obj),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(clamp_page_size(10), (10, false));
        assert_eq!(clamp_page_size(30), (30, false));
        assert_eq!(clamp_page_size(50), (30, true));
        assert_eq!(clamp_page_size(0), (1, true));
    }

    #[test]
    fn test_saved_item_url_fallback() {
        let it = item(json!({
            "item_id": "123",
            "given_url": "https://example.com/original",
            "resolved_url": "https://example.com/canonical"
        }));
        assert_eq!(it.url().as_deref(), Some("https://example.com/canonical"));

        // Pocket reports an unresolved URL as an empty string
        let it = item(json!({
            "item_id": "124",
            "given_url": "https://example.com/original",
            "resolved_url": ""
        }));
        assert_eq!(it.url().as_deref(), Some("https://example.com/original"));

        let it = item(json!({"item_id": "125"}));
        assert_eq!(it.url(), None);
    }

    #[test]
    fn test_saved_item_title_and_tags() {
        let it = item(json!({
            "item_id": "1",
            "given_title": "Given",
            "resolved_title": "Resolved",
            "tags": {"rust": {"tag": "rust"}, "longform": {"tag": "longform"}}
        }));
        assert_eq!(it.title().as_deref(), Some("Resolved"));
        let tags = it.tags();
        assert!(tags.contains(&"rust".to_string()));
        assert!(tags.contains(&"longform".to_string()));
    }

    #[test]
    fn test_saved_item_numeric_strings() {
        let it = item(json!({
            "item_id": "1",
            "word_count": "1542",
            "time_added": "1716400000"
        }));
        assert_eq!(it.word_count(), Some(1542));
        assert_eq!(it.time_added(), Some(1_716_400_000));
    }

    #[test]
    fn test_raw_page_empty_list_as_array() {
        let raw: RawPage = serde_json::from_str(r#"{"list": [], "total": "0"}"#).unwrap();
        let page = raw.into_page();
        assert!(page.items.is_empty());
        assert_eq!(page.total, Some(0));
    }

    #[test]
    fn test_raw_page_total_as_number_or_string() {
        let raw: RawPage = serde_json::from_str(r#"{"list": {}, "total": 65}"#).unwrap();
        assert_eq!(raw.into_page().total, Some(65));

        let raw: RawPage = serde_json::from_str(r#"{"list": {}, "total": "65"}"#).unwrap();
        assert_eq!(raw.into_page().total, Some(65));

        let raw: RawPage = serde_json::from_str(r#"{"list": {}}"#).unwrap();
        assert_eq!(raw.into_page().total, None);
    }

    #[test]
    fn test_raw_page_preserves_server_order() {
        // Keys deliberately out of lexical order: the server's sort order
        // must survive the id -> record map.
        let raw: RawPage = serde_json::from_str(
            r#"{"list": {"900": {"item_id": "900"}, "100": {"item_id": "100"}, "500": {"item_id": "500"}}}"#,
        )
        .unwrap();
        let page = raw.into_page();
        let ids: Vec<_> = page.items.iter().filter_map(SavedItem::id).collect();
        assert_eq!(ids, vec!["900", "100", "500"]);
    }

    #[test]
    fn test_saved_item_roundtrip() {
        let it = item(json!({"item_id": "42", "given_url": "https://example.com"}));
        let encoded = serde_json::to_string(&it).unwrap();
        let decoded: SavedItem = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, it);
    }
}
