//! Local fallback cache: one JSON file holding the most recent entries.
//!
//! Serves anonymous sessions and bridges durable-store outages. The on-disk
//! shape is a plain array, most-recent-first, capped at [`MAX_ENTRIES`].

use std::fs;
use std::io;
use std::path::PathBuf;

use crate::core::paths;

use super::HistoryEntry;

/// Cap on cached entries; oldest are evicted first.
pub const MAX_ENTRIES: usize = 50;

const CACHE_FILE: &str = "history.json";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed cache file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Typed handle over the cache file. All (de)serialization lives here; the
/// rest of the flow never touches the storage format.
#[derive(Debug, Clone)]
pub struct FallbackCache {
    path: PathBuf,
}

impl FallbackCache {
    /// Cache in the platform data directory. `None` when no home is resolvable.
    pub fn open_default() -> Option<Self> {
        paths::data_dir().map(|d| Self { path: d.join(CACHE_FILE) })
    }

    /// Cache at an explicit path (tests).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load cached entries, most-recent-first. A missing file is an empty
    /// history; a malformed file is a `Parse` error for the caller to drop.
    pub fn load(&self) -> Result<Vec<HistoryEntry>, CacheError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };
        let entries: Vec<HistoryEntry> = serde_json::from_str(&data)?;
        Ok(entries)
    }

    /// Write entries, truncated to the cap. Atomic (tmp + rename).
    pub fn store(&self, entries: &[HistoryEntry]) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let capped = &entries[..entries.len().min(MAX_ENTRIES)];
        let json = serde_json::to_string_pretty(capped)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(tmp, &self.path)?;
        Ok(())
    }

    /// Remove the cache file. A missing file is not an error.
    pub fn clear(&self) -> Result<(), CacheError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
