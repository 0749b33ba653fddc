//! Generation history: in-memory view, durable store, and local fallback cache.
//!
//! Writes are best-effort dual writes. The in-memory view is updated
//! synchronously, so a result is always visible to the session even when the
//! durable write fails (at-least-once visibility, not exactly-once
//! durability). The durable and cache outcomes are reported to the monitor
//! under distinct contexts so drift stays observable.

mod cache;
mod remote;

pub use cache::{CacheError, FallbackCache, MAX_ENTRIES};
pub use remote::{DurableStore, HttpHistoryStore, StoreError};

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::generation::TokenUsage;
use crate::core::monitor::Monitor;

/// One past generation, as shown in the history view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub prompt: String,
    pub content: String,
    pub template_id: Option<String>,
    pub template_name: Option<String>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    pub model_id: String,
    pub provider: String,
    pub created_at: DateTime<Utc>,
    pub usage: Option<TokenUsage>,
}

/// Errors from explicit history actions (not the best-effort dual write).
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Authentication required")]
    Unauthenticated,
    #[error("No history entry with id {0}")]
    UnknownEntry(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// History for one session: durable store for signed-in users, fallback cache
/// always.
pub struct HistoryStore {
    durable: Option<Arc<dyn DurableStore>>,
    user_id: Option<String>,
    cache: Option<FallbackCache>,
    monitor: Arc<dyn Monitor>,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new(
        durable: Option<Arc<dyn DurableStore>>,
        user_id: Option<String>,
        cache: Option<FallbackCache>,
        monitor: Arc<dyn Monitor>,
    ) -> Self {
        Self {
            durable,
            user_id,
            cache,
            monitor,
            entries: vec![],
        }
    }

    /// Cache-only store for anonymous sessions.
    pub fn local(cache: Option<FallbackCache>, monitor: Arc<dyn Monitor>) -> Self {
        Self::new(None, None, cache, monitor)
    }

    /// Populate the in-memory view: durable store when signed in, otherwise
    /// (or when the store is unreachable) the fallback cache.
    pub async fn hydrate(&mut self) {
        if let (Some(durable), Some(user_id)) = (&self.durable, &self.user_id) {
            match durable.list(user_id).await {
                Ok(entries) => {
                    self.entries = entries;
                    self.entries.truncate(MAX_ENTRIES);
                    return;
                }
                Err(e) => {
                    self.monitor.capture_error("history.durable", &e);
                }
            }
        }
        self.entries = self.load_cache();
    }

    fn load_cache(&self) -> Vec<HistoryEntry> {
        let Some(cache) = &self.cache else {
            return vec![];
        };
        match cache.load() {
            Ok(entries) => entries,
            Err(e @ CacheError::Parse(_)) => {
                // Corrupt cache: report, drop the file, start empty.
                self.monitor.capture_error("history.cache", &e);
                if let Err(e) = cache.clear() {
                    self.monitor.capture_error("history.cache", &e);
                }
                vec![]
            }
            Err(e) => {
                self.monitor.capture_error("history.cache", &e);
                vec![]
            }
        }
    }

    /// Most-recent-first session view.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Record one generation. Prepends to the in-memory view synchronously,
    /// then best-effort writes the durable store (signed-in only) and the
    /// fallback cache. Never fails: persistence problems are monitor-captured.
    pub async fn record(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry.clone());
        self.entries.truncate(MAX_ENTRIES);

        if let (Some(durable), Some(user_id)) = (&self.durable, &self.user_id) {
            match durable.insert(user_id, &entry).await {
                Ok(()) => self.monitor.breadcrumb(
                    "history.durable",
                    "entry persisted",
                    serde_json::json!({ "id": entry.id }),
                ),
                Err(e) => self.monitor.capture_error("history.durable", &e),
            }
        }

        if let Some(cache) = &self.cache {
            match cache.store(&self.entries) {
                Ok(()) => self.monitor.breadcrumb(
                    "history.cache",
                    "cache updated",
                    serde_json::json!({ "entries": self.entries.len() }),
                ),
                Err(e) => self.monitor.capture_error("history.cache", &e),
            }
        }
    }

    /// Explicitly persist one entry from the session view to the durable
    /// store. Requires a signed-in user; store failures surface here because
    /// the user asked for this write.
    pub async fn save_to_library(&self, entry_id: &str) -> Result<(), HistoryError> {
        let (Some(durable), Some(user_id)) = (&self.durable, &self.user_id) else {
            return Err(HistoryError::Unauthenticated);
        };
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == entry_id)
            .ok_or_else(|| HistoryError::UnknownEntry(entry_id.to_string()))?;
        durable.insert(user_id, entry).await?;
        Ok(())
    }

    /// Clear the session's history everywhere: memory, durable store, cache.
    pub async fn clear(&mut self) {
        self.entries.clear();

        if let (Some(durable), Some(user_id)) = (&self.durable, &self.user_id) {
            if let Err(e) = durable.clear(user_id).await {
                self.monitor.capture_error("history.durable", &e);
            }
        }

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.clear() {
                self.monitor.capture_error("history.cache", &e);
            }
        }
    }
}

#[cfg(test)]
mod tests;
