//! # Player Service
//!
//! The engine's public surface and the playback-start state machine. One
//! logical playback session is active at most; starting a new one always
//! supersedes the old one by resetting the native queue first, and by
//! bumping the state generation. Both the old session's background work
//! and its still-resolving start path re-check the generation before
//! every queue mutation, so a stalled request that resumes after a newer
//! session started cannot touch the newer queue.

use bridge_traits::catalog::CatalogService;
use bridge_traits::engine::{EngineState, PlayerEngine, QueueTrack};
use bridge_traits::http::HttpClient;
use bridge_traits::storage::FileSystemAccess;
use bytes::Bytes;
use futures::join;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::PlayerConfig;
use crate::download::DownloadManager;
use crate::error::{PlaybackError, Result};
use crate::history::{HistoryEntry, HistoryLog};
use crate::paths::{file_uri, CachePaths};
use crate::queue::QueueExtender;
use crate::state::{PlayerState, StateStore, StateUpdate, Subscription};

/// Options for a playback request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayOptions {
    /// Keep extending the existing recommendation sequence instead of
    /// seeding a fresh one, unless the queue end is near.
    pub preserve_queue: bool,
    /// Resolve from local assets only; fail rather than touch the network.
    pub local_only: bool,
    /// Resolve from the persistent downloads root only.
    pub downloaded_only: bool,
}

impl PlayOptions {
    /// Remote-preferring resolution (the default).
    pub fn remote() -> Self {
        Self::default()
    }

    /// Cached-local-only resolution.
    pub fn local() -> Self {
        Self {
            local_only: true,
            ..Self::default()
        }
    }

    /// Downloads-root-only resolution.
    pub fn downloaded() -> Self {
        Self {
            downloaded_only: true,
            ..Self::default()
        }
    }

    pub(crate) fn requires_local(&self) -> bool {
        self.local_only || self.downloaded_only
    }
}

/// Playback orchestration service.
///
/// Cloning is cheap; clones share all state. Constructed once at
/// application start and injected into UI collaborators.
#[derive(Clone)]
pub struct PlayerService {
    pub(crate) catalog: Arc<dyn CatalogService>,
    pub(crate) engine: Arc<dyn PlayerEngine>,
    pub(crate) http: Arc<dyn HttpClient>,
    pub(crate) fs: Arc<dyn FileSystemAccess>,
    pub(crate) state: StateStore,
    pub(crate) paths: Arc<CachePaths>,
    pub(crate) extender: Arc<QueueExtender>,
    pub(crate) history: Arc<HistoryLog>,
    pub(crate) downloads: Arc<DownloadManager>,
    pub(crate) config: Arc<PlayerConfig>,
}

impl PlayerService {
    pub async fn new(
        config: PlayerConfig,
        catalog: Arc<dyn CatalogService>,
        engine: Arc<dyn PlayerEngine>,
        http: Arc<dyn HttpClient>,
        fs: Arc<dyn FileSystemAccess>,
    ) -> Result<Self> {
        config.validate().map_err(PlaybackError::InvalidConfig)?;

        let state = StateStore::new();
        let paths = Arc::new(CachePaths::new(Arc::clone(&fs), &config).await?);
        let extender = Arc::new(QueueExtender::new(
            Arc::clone(&catalog),
            Arc::clone(&engine),
            state.clone(),
        ));
        let history = Arc::new(HistoryLog::new(Arc::clone(&fs), config.history_limit));
        let downloads = Arc::new(DownloadManager::new(
            Arc::clone(&catalog),
            Arc::clone(&http),
            Arc::clone(&fs),
            Arc::clone(&paths),
            config.max_concurrent_downloads,
        ));

        Ok(Self {
            catalog,
            engine,
            http,
            fs,
            state,
            paths,
            extender,
            history,
            downloads,
            config: Arc::new(config),
        })
    }

    /// Start a new playback session for a track.
    ///
    /// Resolves the playable source from the downloads root, the cache, or
    /// a live stream depending on what exists and what `options` allow;
    /// submits a single-track queue to the engine; starts playback; and
    /// schedules the post-playback background work. Returns once playback
    /// has started, without waiting for the background work.
    ///
    /// # Errors
    ///
    /// [`PlaybackError::OfflineUnavailable`] when a locality-restricted
    /// mode finds no local audio, and resolution errors from the catalog
    /// or engine. On error the loading flag is rolled back and observers
    /// re-notified; no session is left half-started.
    pub async fn play_track(&self, id: &str, options: PlayOptions) -> Result<()> {
        info!(id, ?options, "Starting playback session");
        let was_active = self.state.is_active();
        let generation = self.state.begin_session();

        match self.resolve_and_start(id, &options, generation).await {
            Ok(Some(track)) => {
                let service = self.clone();
                tokio::spawn(async move {
                    service
                        .run_post_playback_tasks(track, options, generation)
                        .await;
                });
                Ok(())
            }
            Ok(None) => {
                debug!(id, "Playback request superseded by a newer session");
                Ok(())
            }
            Err(e) => {
                // Roll back only while this request still owns the session;
                // a newer session's state is not ours to touch. An offline
                // rejection happens before the queue reset, so a previously
                // active session keeps playing; any other failure leaves no
                // playable track behind.
                if self.state.generation() == generation {
                    let rollback = if e.is_offline_unavailable() {
                        StateUpdate::new().loading(false).active(was_active)
                    } else {
                        StateUpdate::new().loading(false).active(false)
                    };
                    self.state.apply(rollback);
                }
                Err(e)
            }
        }
    }

    /// Returns `Ok(None)` when a newer session superseded this request at
    /// one of its suspension points; the caller then leaves all state to
    /// the newer session.
    async fn resolve_and_start(
        &self,
        id: &str,
        options: &PlayOptions,
        generation: u64,
    ) -> Result<Option<QueueTrack>> {
        let loc = self.paths.resolve(id).await?;
        let files = if options.downloaded_only {
            &loc.downloads
        } else {
            &loc.cache
        };

        let (audio, meta, art) = join!(
            self.fs.exists(&files.audio),
            self.fs.exists(&files.meta),
            self.fs.exists(&files.art),
        );
        let (has_audio, has_meta, has_art) = (audio?, meta?, art?);

        // The offline check runs before the queue reset so a rejected
        // locality-restricted request leaves the queue untouched.
        if options.requires_local() && !has_audio {
            return Err(PlaybackError::OfflineUnavailable(id.to_string()));
        }

        // A new session always supersedes the old queue wholesale; a
        // request that was itself superseded while probing must not reset
        // the newer session's queue.
        if self.state.generation() != generation {
            debug!(id, "Superseded before queue reset");
            return Ok(None);
        }
        self.engine.reset_queue().await?;

        let metadata = if has_meta {
            let bytes = self.fs.read_file(&files.meta).await?;
            serde_json::from_slice(&bytes).map_err(|e| PlaybackError::InvalidMetadata {
                id: id.to_string(),
                reason: e.to_string(),
            })?
        } else {
            self.catalog.get_song(id).await?
        };

        let url = if has_audio {
            file_uri(&files.audio)
        } else {
            let stream = self.catalog.stream_music(id).await?;
            self.schedule_metadata_cache_write(&metadata, loc.cache.meta.clone());
            stream.url
        };

        let artwork = if has_art {
            Some(file_uri(&files.art))
        } else {
            metadata.artwork_url.clone()
        };

        let track = QueueTrack {
            id: id.to_string(),
            url,
            title: metadata.title.clone(),
            artist: metadata.artist.clone(),
            artwork,
            duration: metadata.duration_secs.map(Duration::from_secs),
        };

        // Resolution suspends on the catalog; re-check before submitting.
        if self.state.generation() != generation {
            debug!(id, "Superseded during resolution");
            return Ok(None);
        }
        self.engine.set_queue(vec![track.clone()]).await?;

        if self.state.generation() != generation {
            debug!(id, "Superseded after queue submission");
            return Ok(None);
        }
        self.state.apply(StateUpdate::new().loading(false));
        self.engine.play().await?;

        Ok(Some(track))
    }

    // Best effort; playback must not wait for, or fail on, this write.
    fn schedule_metadata_cache_write(
        &self,
        metadata: &bridge_traits::catalog::SongMetadata,
        path: std::path::PathBuf,
    ) {
        let fs = Arc::clone(&self.fs);
        let metadata = metadata.clone();
        tokio::spawn(async move {
            match serde_json::to_vec(&metadata) {
                Ok(doc) => {
                    if let Err(e) = fs.write_file(&path, Bytes::from(doc)).await {
                        warn!(id = %metadata.id, error = %e, "Failed to cache metadata document");
                    }
                }
                Err(e) => {
                    warn!(id = %metadata.id, error = %e, "Failed to encode metadata document")
                }
            }
        });
    }

    /// Jump to an absolute index of the engine queue. Out-of-range
    /// indices are refused with a warning.
    pub async fn skip_to_index(&self, index: usize) -> Result<()> {
        let queue = self.engine.queue().await?;
        let Some(track) = queue.get(index).cloned() else {
            warn!(index, len = queue.len(), "Skip index out of range");
            return Ok(());
        };

        self.engine.skip_to_index(index).await?;
        self.state.notify();

        let service = self.clone();
        let generation = self.state.generation();
        let options = PlayOptions {
            preserve_queue: true,
            ..PlayOptions::default()
        };
        tokio::spawn(async move {
            service.run_post_playback_tasks(track, options, generation).await;
        });
        Ok(())
    }

    /// Advance to the next queue entry; refuses past the queue end.
    pub async fn play_next(&self) -> Result<()> {
        let queue = self.engine.queue().await?;
        let active = self.engine.active_track_index().await?;
        let Some(track) = queue.get(active + 1).cloned() else {
            warn!(active, len = queue.len(), "Already at the end of the queue");
            return Ok(());
        };

        self.engine.skip_to_next().await?;
        self.state.notify();

        let service = self.clone();
        let generation = self.state.generation();
        let options = PlayOptions {
            preserve_queue: true,
            ..PlayOptions::default()
        };
        tokio::spawn(async move {
            service.run_post_playback_tasks(track, options, generation).await;
        });
        Ok(())
    }

    /// Return to the previous queue entry; no-op at the first.
    pub async fn play_previous(&self) -> Result<()> {
        let active = self.engine.active_track_index().await?;
        if active == 0 {
            debug!("Already at the start of the queue");
            return Ok(());
        }

        self.engine.skip_to_previous().await?;
        self.state.notify();
        Ok(())
    }

    /// Pause when playing, otherwise play.
    pub async fn toggle_playback(&self) -> Result<()> {
        match self.engine.playback_state().await? {
            EngineState::Playing => self.engine.pause().await?,
            _ => self.engine.play().await?,
        }
        Ok(())
    }

    /// End the session: reset state to defaults (bumping the generation so
    /// in-flight extensions abort) and discard the engine queue.
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping playback session");
        self.state.reset();
        self.engine.reset_queue().await?;
        Ok(())
    }

    /// Persist a track's assets into the downloads root.
    pub async fn download(&self, id: &str) -> Result<()> {
        self.downloads.download(id).await
    }

    /// Whether a track is fully present in the downloads root.
    pub async fn is_downloaded(&self, id: &str) -> Result<bool> {
        self.downloads.is_downloaded(id).await
    }

    /// Metadata of every fully persisted download.
    pub async fn list_downloads(&self) -> Result<Vec<bridge_traits::catalog::SongMetadata>> {
        self.downloads.list_downloads().await
    }

    /// Local play history, newest first.
    pub async fn play_history(&self) -> Result<Vec<HistoryEntry>> {
        self.history.entries().await
    }

    /// Register a state observer.
    pub fn subscribe(
        &self,
        callback: impl Fn(&PlayerState) + Send + Sync + 'static,
    ) -> Subscription {
        self.state.subscribe(callback)
    }

    /// Snapshot of the current observable state.
    pub fn state_snapshot(&self) -> PlayerState {
        self.state.snapshot()
    }

    pub fn loading(&self) -> bool {
        self.state.loading()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }
}
