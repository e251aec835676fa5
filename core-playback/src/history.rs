//! # Local Play History
//!
//! Persists the listening history as a single `history.json` document
//! under the data directory: newest first, de-duplicated by track id,
//! capped at a configured number of entries.

use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::Result;

const HISTORY_FILE: &str = "history.json";

/// One recorded play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork: Option<String>,
    pub played_at: DateTime<Utc>,
}

/// Append-capped local history log.
pub struct HistoryLog {
    fs: Arc<dyn FileSystemAccess>,
    limit: usize,
    // Serializes the read-modify-write cycle of `record`.
    write_lock: tokio::sync::Mutex<()>,
}

impl HistoryLog {
    pub fn new(fs: Arc<dyn FileSystemAccess>, limit: usize) -> Self {
        Self {
            fs,
            limit,
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Record a play: existing entries for the same track move to the
    /// front, the log is truncated to the configured cap.
    pub async fn record(&self, entry: HistoryEntry) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.load().await?;
        entries.retain(|e| e.id != entry.id);
        entries.insert(0, entry);
        entries.truncate(self.limit);

        let path = self.file_path().await?;
        let doc = serde_json::to_vec(&entries)?;
        self.fs.write_file(&path, Bytes::from(doc)).await?;
        debug!(count = entries.len(), "Recorded history entry");
        Ok(())
    }

    /// All retained entries, newest first.
    pub async fn entries(&self) -> Result<Vec<HistoryEntry>> {
        self.load().await
    }

    /// Remove all entries.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.file_path().await?;
        self.fs.write_file(&path, Bytes::from("[]")).await?;
        Ok(())
    }

    async fn file_path(&self) -> Result<PathBuf> {
        Ok(self.fs.get_data_directory().await?.join(HISTORY_FILE))
    }

    async fn load(&self) -> Result<Vec<HistoryEntry>> {
        let path = self.file_path().await?;
        if !self.fs.exists(&path).await? {
            return Ok(Vec::new());
        }

        let bytes = self.fs.read_file(&path).await?;
        match serde_json::from_slice(&bytes) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // A corrupt log is not worth failing playback over.
                warn!(error = %e, "History file unreadable, starting fresh");
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MemFs;

    fn entry(id: &str) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            title: format!("Track {}", id),
            artist: "Artist".to_string(),
            artwork: None,
            played_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn records_newest_first() {
        let log = HistoryLog::new(Arc::new(MemFs::new()), 100);
        log.record(entry("v1")).await.unwrap();
        log.record(entry("v2")).await.unwrap();

        let entries = log.entries().await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["v2", "v1"]);
    }

    #[tokio::test]
    async fn replaying_a_track_moves_it_to_the_front() {
        let log = HistoryLog::new(Arc::new(MemFs::new()), 100);
        log.record(entry("v1")).await.unwrap();
        log.record(entry("v2")).await.unwrap();
        log.record(entry("v1")).await.unwrap();

        let entries = log.entries().await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn truncates_to_limit() {
        let log = HistoryLog::new(Arc::new(MemFs::new()), 3);
        for i in 0..5 {
            log.record(entry(&format!("v{}", i))).await.unwrap();
        }

        let entries = log.entries().await.unwrap();
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["v4", "v3", "v2"]);
    }

    #[tokio::test]
    async fn tolerates_corrupt_file() {
        let fs = Arc::new(MemFs::new());
        fs.insert("/data/history.json", "not json");

        let log = HistoryLog::new(fs, 100);
        assert!(log.entries().await.unwrap().is_empty());

        log.record(entry("v1")).await.unwrap();
        assert_eq!(log.entries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_empties_the_log() {
        let log = HistoryLog::new(Arc::new(MemFs::new()), 100);
        log.record(entry("v1")).await.unwrap();
        log.clear().await.unwrap();
        assert!(log.entries().await.unwrap().is_empty());
    }
}
