//! Tests for the pagination driver
//!
//! All network behavior is simulated with wiremock; checkpoint behavior
//! uses the in-memory store unless file semantics are the point.

use super::*;
use crate::api::{Credential, PocketClient, SavedItem};
use crate::checkpoint::{CheckpointStore, MemoryCheckpointStore};
use crate::http::{HttpClient, HttpClientConfig};
use crate::types::BackoffType;
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_client(server: &MockServer) -> PocketClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .max_retries(1)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(5),
            Duration::from_millis(50),
        )
        .no_rate_limit()
        .build();
    PocketClient::new(
        HttpClient::with_config(config),
        Credential::new("ckey", "atoken"),
    )
}

fn fast_config(page_size: u32) -> DriverConfig {
    DriverConfig::new()
        .with_page_size(page_size)
        .with_stall_retry_delay(Duration::from_millis(10))
        .with_max_stall(Duration::from_millis(50))
}

/// Body of one page: items [start, start + count) with the advisory total
fn page_body(start: u64, count: u64, total: u64) -> Value {
    let mut list = Map::new();
    for i in start..start + count {
        list.insert(
            format!("item-{i}"),
            json!({"item_id": format!("item-{i}"), "given_url": format!("https://example.com/{i}")}),
        );
    }
    json!({"list": list, "total": total.to_string()})
}

fn spooled(start: u64, count: u64) -> Vec<SavedItem> {
    match page_body(start, count, 0)["list"].clone() {
        Value::Object(map) => map
            .into_iter()
            .map(|(_, v)| match v {
                Value::Object(obj) => SavedItem::new(obj),
                _ => unreachable!(),
            })
            .collect(),
        _ => unreachable!(),
    }
}

/// Mount one page mock keyed on its offset. Offsets used in these tests
/// are chosen so no `offset=N` string is a prefix of another.
async fn mount_page(server: &MockServer, start: u64, count: u64, total: u64) {
    Mock::given(method("POST"))
        .and(path("/v3/get"))
        .and(body_string_contains(format!("offset={start}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(start, count, total)))
        .expect(1)
        .mount(server)
        .await;
}

/// Mount all pages of an n-item collection retrieved p at a time
async fn mount_collection(server: &MockServer, n: u64, p: u64) {
    let mut start = 0;
    while start < n {
        let count = p.min(n - start);
        mount_page(server, start, count, n).await;
        start += count;
    }
}

fn ids(items: &[SavedItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|i| i.id().map(ToString::to_string))
        .collect()
}

// ============================================================================
// Termination
// ============================================================================

#[test_case(65, 30, 3 ; "short final page")]
#[test_case(60, 30, 2 ; "exact multiple")]
#[test_case(30, 30, 1 ; "single full page")]
#[test_case(1, 30, 1 ; "single item")]
#[test_case(95, 20, 5 ; "five pages")]
#[tokio::test]
async fn test_terminates_after_ceil_n_over_p_pages(n: u64, p: u64, expected_pages: usize) {
    let server = MockServer::start().await;
    mount_collection(&server, n, p).await;

    let mut driver = ExportDriver::new(
        api_client(&server),
        MemoryCheckpointStore::new(),
        fast_config(p as u32),
    );
    let run = driver.run(&CancelToken::new()).await.unwrap();

    assert_eq!(run.items.len() as u64, n);
    assert_eq!(run.stats.pages_fetched, expected_pages);
    // Clean completion clears the checkpoint
    assert_eq!(driver.store().read(), 0);
}

#[tokio::test]
async fn test_scenario_65_items_in_pages_of_30() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 30, 65).await;
    mount_page(&server, 30, 30, 65).await;
    mount_page(&server, 60, 5, 65).await;

    let mut driver = ExportDriver::new(
        api_client(&server),
        MemoryCheckpointStore::new(),
        fast_config(30),
    );
    let run = driver.run(&CancelToken::new()).await.unwrap();

    assert_eq!(run.items.len(), 65);
    assert_eq!(run.stats.pages_fetched, 3);
    assert_eq!(run.stats.items_fetched, 65);
    assert_eq!(driver.store().read(), 0);

    // Accumulation preserves retrieval order from offset 0
    let expected: Vec<String> = (0..65).map(|i| format!("item-{i}")).collect();
    assert_eq!(ids(&run.items), expected);
}

#[tokio::test]
async fn test_zero_item_page_terminates_regardless_of_total() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/get"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"list": {}, "total": "100"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut driver = ExportDriver::new(
        api_client(&server),
        MemoryCheckpointStore::new(),
        fast_config(30),
    );
    let run = driver.run(&CancelToken::new()).await.unwrap();

    assert!(run.items.is_empty());
    assert_eq!(run.stats.pages_fetched, 1);
    assert_eq!(driver.store().read(), 0);
}

#[tokio::test]
async fn test_shrinking_total_still_terminates_on_empty_page() {
    let server = MockServer::start().await;
    // First page claims 100 items; the collection then shrinks remotely
    mount_page(&server, 0, 30, 100).await;
    Mock::given(method("POST"))
        .and(path("/v3/get"))
        .and(body_string_contains("offset=30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": {}, "total": "10"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut driver = ExportDriver::new(
        api_client(&server),
        MemoryCheckpointStore::new(),
        fast_config(30),
    );
    let run = driver.run(&CancelToken::new()).await.unwrap();

    assert_eq!(run.items.len(), 30);
    assert_eq!(run.stats.pages_fetched, 2);
}

// ============================================================================
// Resume
// ============================================================================

#[tokio::test]
async fn test_resume_fetches_only_from_checkpoint_offset() {
    let server = MockServer::start().await;
    // Only offsets 30 and 60 are mounted: any request for offset 0..29
    // would 404 and fail the run.
    mount_page(&server, 30, 30, 65).await;
    mount_page(&server, 60, 5, 65).await;

    let store = MemoryCheckpointStore::with_progress(30, spooled(0, 30));
    let mut driver = ExportDriver::new(api_client(&server), store, fast_config(30));
    let run = driver.run(&CancelToken::new()).await.unwrap();

    assert_eq!(run.stats.resumed_from, 30);
    assert_eq!(run.stats.pages_fetched, 2);
    assert_eq!(run.stats.items_fetched, 35);
    // Spool restore makes the collection complete from offset 0
    assert_eq!(run.items.len(), 65);
    let expected: Vec<String> = (0..65).map(|i| format!("item-{i}")).collect();
    assert_eq!(ids(&run.items), expected);
    assert_eq!(driver.store().read(), 0);
}

#[tokio::test]
async fn test_resume_from_completed_offset_terminates_immediately() {
    let server = MockServer::start().await;
    // A stale checkpoint at the full collection size: the resumed request
    // comes back empty and the run completes at once.
    Mock::given(method("POST"))
        .and(path("/v3/get"))
        .and(body_string_contains("offset=65"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"list": {}, "total": "65"})))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryCheckpointStore::with_progress(65, spooled(0, 65));
    let mut driver = ExportDriver::new(api_client(&server), store, fast_config(30));
    let run = driver.run(&CancelToken::new()).await.unwrap();

    assert_eq!(run.items.len(), 65);
    assert_eq!(run.stats.items_fetched, 0);
    assert_eq!(driver.store().read(), 0);
}

#[tokio::test]
async fn test_spool_mismatch_starts_over() {
    let server = MockServer::start().await;
    mount_collection(&server, 2, 30).await;

    // Checkpoint says 30 but only 10 items were spooled
    let store = MemoryCheckpointStore::with_progress(30, spooled(0, 10));
    let mut driver = ExportDriver::new(api_client(&server), store, fast_config(30));
    let run = driver.run(&CancelToken::new()).await.unwrap();

    assert_eq!(run.stats.resumed_from, 0);
    assert_eq!(run.items.len(), 2);
}

// ============================================================================
// Clamping
// ============================================================================

#[tokio::test]
async fn test_page_size_above_cap_is_clamped_not_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/get"))
        .and(body_string_contains("count=30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0, 1, 1)))
        .expect(1)
        .mount(&server)
        .await;

    let mut driver = ExportDriver::new(
        api_client(&server),
        MemoryCheckpointStore::new(),
        fast_config(50),
    );
    let run = driver.run(&CancelToken::new()).await.unwrap();
    assert_eq!(run.items.len(), 1);
}

// ============================================================================
// Failure paths
// ============================================================================

#[tokio::test]
async fn test_retry_exhaustion_fails_run_with_checkpoint_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v3/get"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let store = MemoryCheckpointStore::with_progress(30, spooled(0, 30));
    let mut driver = ExportDriver::new(api_client(&server), store, fast_config(30));
    let err = driver.run(&CancelToken::new()).await.unwrap_err();

    assert!(matches!(
        err,
        crate::error::Error::HttpStatus { status: 500, .. }
    ));
    // Checkpoint still at the last successfully completed offset
    assert_eq!(driver.store().read(), 30);
}

#[tokio::test]
async fn test_malformed_page_is_fatal_and_preserves_checkpoint() {
    let server = MockServer::start().await;
    mount_page(&server, 0, 30, 65).await;
    Mock::given(method("POST"))
        .and(path("/v3/get"))
        .and(body_string_contains("offset=30"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>surprise</html>"))
        .mount(&server)
        .await;

    let mut driver = ExportDriver::new(
        api_client(&server),
        MemoryCheckpointStore::new(),
        fast_config(30),
    );
    let err = driver.run(&CancelToken::new()).await.unwrap_err();

    assert!(matches!(err, crate::error::Error::Decode { .. }));
    assert_eq!(driver.store().read(), 30);
    assert_eq!(driver.store().load_items().unwrap().len(), 30);
}

#[tokio::test]
async fn test_checkpoint_write_failure_is_fatal() {
    struct WriteFails(MemoryCheckpointStore);

    impl CheckpointStore for WriteFails {
        fn read(&self) -> u64 {
            self.0.read()
        }
        fn write(&mut self, _offset: u64) -> crate::error::Result<()> {
            Err(crate::error::Error::checkpoint("disk full"))
        }
        fn clear(&mut self) -> crate::error::Result<()> {
            self.0.clear()
        }
        fn append_items(&mut self, items: &[SavedItem]) -> crate::error::Result<()> {
            self.0.append_items(items)
        }
        fn load_items(&self) -> crate::error::Result<Vec<SavedItem>> {
            self.0.load_items()
        }
    }

    let server = MockServer::start().await;
    mount_collection(&server, 1, 30).await;

    let mut driver = ExportDriver::new(
        api_client(&server),
        WriteFails(MemoryCheckpointStore::new()),
        fast_config(30),
    );
    let err = driver.run(&CancelToken::new()).await.unwrap_err();
    assert!(matches!(err, crate::error::Error::Checkpoint { .. }));
}

#[tokio::test]
async fn test_connection_stall_budget_gives_up() {
    // Point at a port nobody listens on: every attempt is a connection
    // failure, so the outer loop runs until its wall-clock budget is spent.
    let config = HttpClientConfig::builder()
        .base_url("http://127.0.0.1:9")
        .timeout(Duration::from_millis(200))
        .max_retries(0)
        .no_rate_limit()
        .build();
    let api = PocketClient::new(
        HttpClient::with_config(config),
        Credential::new("ckey", "atoken"),
    );

    let mut driver = ExportDriver::new(api, MemoryCheckpointStore::new(), fast_config(30));
    let err = driver.run(&CancelToken::new()).await.unwrap_err();
    assert!(matches!(
        err,
        crate::error::Error::ConnectionStalled { .. }
    ));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancellation_preserves_checkpoint() {
    let server = MockServer::start().await;

    let cancel = CancelToken::new();
    cancel.cancel();

    let store = MemoryCheckpointStore::with_progress(30, spooled(0, 30));
    let mut driver = ExportDriver::new(api_client(&server), store, fast_config(30));
    let err = driver.run(&cancel).await.unwrap_err();

    assert!(matches!(err, crate::error::Error::Cancelled));
    assert_eq!(driver.store().read(), 30);
    // No requests were made
    assert!(server.received_requests().await.unwrap().is_empty());
}
