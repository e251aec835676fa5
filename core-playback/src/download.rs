//! # Download Manager
//!
//! Idempotent pipeline that persists a track's three assets into the
//! downloads root. Every step checks for its own output before doing work,
//! so a download interrupted at any point can simply be retried; no
//! cleanup of partial results is performed or needed. The cache-root
//! copies are the working set, and the downloads-root files are written
//! last, by copy, so a failed download never leaves downloads-root files
//! behind and the cache copy stays valid for fast replay.
//!
//! Concurrency: a per-id in-flight registry makes downloads single-flight
//! per track (a second caller awaits the first and then short-circuits),
//! and a semaphore bounds how many tracks download at once.

use bridge_traits::catalog::{CatalogService, SongMetadata};
use bridge_traits::http::HttpClient;
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use core_runtime::logging::strip_path;
use futures::join;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

use crate::error::{PlaybackError, Result};
use crate::paths::{CachePaths, TrackFiles};

pub struct DownloadManager {
    catalog: Arc<dyn CatalogService>,
    http: Arc<dyn HttpClient>,
    fs: Arc<dyn FileSystemAccess>,
    paths: Arc<CachePaths>,
    semaphore: Arc<Semaphore>,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DownloadManager {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        http: Arc<dyn HttpClient>,
        fs: Arc<dyn FileSystemAccess>,
        paths: Arc<CachePaths>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            catalog,
            http,
            fs,
            paths,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Download a track's audio, metadata and artwork into the downloads
    /// root. Returns immediately when all three already exist.
    pub async fn download(&self, id: &str) -> Result<()> {
        let gate = {
            let mut in_flight = self.in_flight.lock().await;
            Arc::clone(
                in_flight
                    .entry(id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };

        let _guard = gate.lock().await;
        let result = self.download_inner(id).await;

        // Drop the registry entry only once no other caller holds the
        // gate (the registry's reference plus ours makes two); waiters
        // still queued keep reusing the same gate. New clones require the
        // registry lock, so the count cannot grow under us here.
        {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(existing) = in_flight.get(id) {
                if Arc::ptr_eq(existing, &gate) && Arc::strong_count(existing) == 2 {
                    in_flight.remove(id);
                }
            }
        }

        result
    }

    async fn download_inner(&self, id: &str) -> Result<()> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| PlaybackError::CacheError("Download semaphore closed".to_string()))?;

        let loc = self.paths.resolve(id).await?;
        if self.all_present(&loc.downloads).await? {
            debug!(id, "Already downloaded");
            return Ok(());
        }

        info!(id, "Starting download");

        let metadata = self.ensure_cached_metadata(id, &loc.cache).await?;

        if !self.fs.exists(&loc.cache.art).await? {
            if let Some(url) = &metadata.artwork_url {
                let art = self.http.fetch_bytes(url).await?;
                self.fs.write_file(&loc.cache.art, art).await?;
            }
        }

        if !self.fs.exists(&loc.cache.audio).await? {
            let stream = self.catalog.stream_music(id).await?;
            let audio = self.http.fetch_bytes(&stream.url).await?;
            self.fs.write_file(&loc.cache.audio, audio).await?;
        }

        // Copy, not move: the cache copy stays valid for fast replay.
        self.fs
            .copy_file(&loc.cache.audio, &loc.downloads.audio)
            .await?;
        self.fs
            .copy_file(&loc.cache.meta, &loc.downloads.meta)
            .await?;
        if self.fs.exists(&loc.cache.art).await? {
            self.fs.copy_file(&loc.cache.art, &loc.downloads.art).await?;
        }

        info!(id, "Download complete");
        Ok(())
    }

    /// Whether all three downloads-root assets exist for a track.
    pub async fn is_downloaded(&self, id: &str) -> Result<bool> {
        let loc = self.paths.resolve(id).await?;
        self.all_present(&loc.downloads).await
    }

    /// Metadata of every fully persisted download, reconstructed from the
    /// `{id}.json` documents in the downloads root.
    pub async fn list_downloads(&self) -> Result<Vec<SongMetadata>> {
        let entries = self
            .fs
            .list_directory(self.paths.downloads_root())
            .await?;

        let mut downloads = Vec::new();
        for path in entries {
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = self.fs.read_file(&path).await?;
            match serde_json::from_slice::<SongMetadata>(&bytes) {
                Ok(metadata) => downloads.push(metadata),
                Err(e) => {
                    let name = path.display().to_string();
                    warn!(file = strip_path(&name), error = %e, "Skipping unreadable metadata document")
                }
            }
        }
        Ok(downloads)
    }

    async fn all_present(&self, files: &TrackFiles) -> Result<bool> {
        let (audio, meta, art) = join!(
            self.fs.exists(&files.audio),
            self.fs.exists(&files.meta),
            self.fs.exists(&files.art),
        );
        Ok(audio? && meta? && art?)
    }

    /// Return the cached metadata document, fetching and persisting it
    /// first when absent or unreadable.
    async fn ensure_cached_metadata(&self, id: &str, cache: &TrackFiles) -> Result<SongMetadata> {
        if self.fs.exists(&cache.meta).await? {
            let bytes = self.fs.read_file(&cache.meta).await?;
            match serde_json::from_slice(&bytes) {
                Ok(metadata) => return Ok(metadata),
                Err(e) => {
                    warn!(id, error = %e, "Cached metadata unreadable, re-fetching")
                }
            }
        }

        let metadata = self.catalog.get_song(id).await?;
        let doc = serde_json::to_vec(&metadata)?;
        self.fs.write_file(&cache.meta, Bytes::from(doc)).await?;
        Ok(metadata)
    }
}
