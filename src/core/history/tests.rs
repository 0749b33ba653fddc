//! History module tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::core::generation::TokenUsage;
use crate::core::history::{
    DurableStore, FallbackCache, HistoryEntry, HistoryError, HistoryStore, MAX_ENTRIES, StoreError,
};
use crate::core::monitor::test_support::RecordingMonitor;

fn entry(id: &str, timestamp_millis: i64) -> HistoryEntry {
    HistoryEntry {
        id: id.to_string(),
        prompt: format!("prompt {}", id),
        content: format!("content {}", id),
        template_id: None,
        template_name: None,
        variables: HashMap::new(),
        model_id: "gemini-pro".to_string(),
        provider: "google".to_string(),
        created_at: Utc.timestamp_millis_opt(timestamp_millis).unwrap(),
        usage: Some(TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 20,
            total_tokens: 30,
        }),
    }
}

/// In-memory durable store that can be told to fail.
#[derive(Default)]
struct FakeDurableStore {
    fail: bool,
    inserts: Mutex<Vec<(String, HistoryEntry)>>,
    cleared: Mutex<Vec<String>>,
}

#[async_trait]
impl DurableStore for FakeDurableStore {
    async fn insert(&self, user_id: &str, entry: &HistoryEntry) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Network("connection reset".to_string()));
        }
        self.inserts
            .lock()
            .unwrap()
            .push((user_id.to_string(), entry.clone()));
        Ok(())
    }

    async fn list(&self, _user_id: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        if self.fail {
            return Err(StoreError::Network("connection reset".to_string()));
        }
        let mut entries: Vec<HistoryEntry> = self
            .inserts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, e)| e.clone())
            .collect();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(entries)
    }

    async fn clear(&self, user_id: &str) -> Result<(), StoreError> {
        self.cleared.lock().unwrap().push(user_id.to_string());
        self.inserts.lock().unwrap().clear();
        Ok(())
    }
}

#[test]
fn cache_roundtrip_preserves_dates_to_the_millisecond() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FallbackCache::at(dir.path().join("history.json"));

    let entries = vec![entry("b", 1_700_000_000_123), entry("a", 1_700_000_000_001)];
    cache.store(&entries).unwrap();

    let loaded = cache.load().unwrap();
    assert_eq!(loaded, entries);
    assert_eq!(loaded[0].created_at.timestamp_millis(), 1_700_000_000_123);
}

#[test]
fn cache_load_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FallbackCache::at(dir.path().join("history.json"));
    assert!(cache.load().unwrap().is_empty());
}

#[test]
fn cache_store_caps_at_max_entries() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FallbackCache::at(dir.path().join("history.json"));

    let entries: Vec<HistoryEntry> = (0..MAX_ENTRIES + 10)
        .map(|i| entry(&format!("e{}", i), 1_700_000_000_000 + i as i64))
        .collect();
    cache.store(&entries).unwrap();

    let loaded = cache.load().unwrap();
    assert_eq!(loaded.len(), MAX_ENTRIES);
    // First entries of the slice survive; the tail is evicted.
    assert_eq!(loaded[0].id, "e0");
}

#[test]
fn cache_clear_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FallbackCache::at(dir.path().join("history.json"));
    cache.clear().unwrap();
    cache.store(&[entry("a", 1)]).unwrap();
    cache.clear().unwrap();
    assert!(cache.load().unwrap().is_empty());
}

#[tokio::test]
async fn hydrate_drops_corrupt_cache_and_reports_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, "{not json").unwrap();

    let monitor = Arc::new(RecordingMonitor::default());
    let mut store = HistoryStore::local(Some(FallbackCache::at(path.clone())), monitor.clone());
    store.hydrate().await;

    assert!(store.entries().is_empty());
    assert!(!path.exists(), "corrupt cache file should be removed");
    let errors = monitor.errors.lock().unwrap();
    assert!(errors.iter().any(|(ctx, _)| ctx == "history.cache"));
}

#[tokio::test]
async fn record_prepends_and_orders_most_recent_first() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FallbackCache::at(dir.path().join("history.json"));
    let monitor = Arc::new(RecordingMonitor::default());
    let mut store = HistoryStore::local(Some(cache), monitor);

    store.record(entry("first", 1_000)).await;
    store.record(entry("second", 2_000)).await;

    let entries = store.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "second");
    assert!(entries[0].created_at >= entries[1].created_at);
}

#[tokio::test]
async fn record_survives_durable_store_failure() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FallbackCache::at(dir.path().join("history.json"));
    let monitor = Arc::new(RecordingMonitor::default());
    let durable = Arc::new(FakeDurableStore {
        fail: true,
        ..Default::default()
    });
    let mut store = HistoryStore::new(
        Some(durable),
        Some("user-1".to_string()),
        Some(cache.clone()),
        monitor.clone(),
    );

    store.record(entry("a", 1_000)).await;

    // Entry is visible in memory and in the cache despite the store failure.
    assert_eq!(store.count(), 1);
    assert_eq!(cache.load().unwrap().len(), 1);
    let errors = monitor.errors.lock().unwrap();
    assert!(errors.iter().any(|(ctx, _)| ctx == "history.durable"));
}

#[tokio::test]
async fn record_inserts_into_durable_store_when_signed_in() {
    let monitor = Arc::new(RecordingMonitor::default());
    let durable = Arc::new(FakeDurableStore::default());
    let mut store = HistoryStore::new(
        Some(durable.clone()),
        Some("user-1".to_string()),
        None,
        monitor,
    );

    store.record(entry("a", 1_000)).await;

    let inserts = durable.inserts.lock().unwrap();
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].0, "user-1");
    assert_eq!(inserts[0].1.id, "a");
}

#[tokio::test]
async fn in_memory_view_never_exceeds_cap() {
    let monitor = Arc::new(RecordingMonitor::default());
    let mut store = HistoryStore::local(None, monitor);
    for i in 0..MAX_ENTRIES + 5 {
        store.record(entry(&format!("e{}", i), i as i64)).await;
    }
    assert_eq!(store.count(), MAX_ENTRIES);
}

#[tokio::test]
async fn save_to_library_without_user_fails_fast() {
    let monitor = Arc::new(RecordingMonitor::default());
    let durable = Arc::new(FakeDurableStore::default());
    // Store configured with no signed-in user.
    let mut store = HistoryStore::new(Some(durable.clone()), None, None, monitor);
    store.record(entry("a", 1_000)).await;

    match store.save_to_library("a").await {
        Err(HistoryError::Unauthenticated) => {}
        other => panic!("expected Unauthenticated, got {:?}", other),
    }
    assert!(durable.inserts.lock().unwrap().is_empty(), "no store call expected");
}

#[tokio::test]
async fn save_to_library_unknown_entry() {
    let monitor = Arc::new(RecordingMonitor::default());
    let durable = Arc::new(FakeDurableStore::default());
    let store = HistoryStore::new(
        Some(durable),
        Some("user-1".to_string()),
        None,
        monitor,
    );

    match store.save_to_library("missing").await {
        Err(HistoryError::UnknownEntry(id)) => assert_eq!(id, "missing"),
        other => panic!("expected UnknownEntry, got {:?}", other),
    }
}

#[tokio::test]
async fn clear_empties_memory_durable_and_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = FallbackCache::at(dir.path().join("history.json"));
    let monitor = Arc::new(RecordingMonitor::default());
    let durable = Arc::new(FakeDurableStore::default());
    let mut store = HistoryStore::new(
        Some(durable.clone()),
        Some("user-1".to_string()),
        Some(cache.clone()),
        monitor,
    );

    store.record(entry("a", 1_000)).await;
    store.clear().await;

    assert_eq!(store.count(), 0);
    assert!(cache.load().unwrap().is_empty());
    assert_eq!(durable.cleared.lock().unwrap().as_slice(), ["user-1"]);
}
