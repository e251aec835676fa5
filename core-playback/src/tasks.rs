//! # Post-Playback Background Tasks
//!
//! Side effects that run detached after playback starts: history
//! recording (remote and local), best-effort capture of the streamed
//! audio into the cache, and conditional queue extension. Nothing here
//! may fail the playing track; every error is caught and logged at this
//! boundary.

use bridge_traits::engine::QueueTrack;
use chrono::Utc;
use futures::join;
use tracing::{debug, warn};

use crate::error::Result;
use crate::history::HistoryEntry;
use crate::player::{PlayOptions, PlayerService};

impl PlayerService {
    /// Run the post-playback side effects for a track that just started.
    ///
    /// History recording and playback-side work (stream capture, queue
    /// extension) are issued together and awaited jointly, so a failure
    /// in one can never prevent the other. Locality-restricted plays keep
    /// their offline guarantee: only the local history is touched, and no
    /// continuation is fetched.
    pub(crate) async fn run_post_playback_tasks(
        &self,
        track: QueueTrack,
        options: PlayOptions,
        generation: u64,
    ) {
        join!(
            self.record_play(&track, &options),
            self.capture_and_extend(&track, &options, generation),
        );
    }

    async fn record_play(&self, track: &QueueTrack, options: &PlayOptions) {
        if !options.requires_local() {
            if let Err(e) = self.catalog.add_history(&track.id).await {
                warn!(id = %track.id, error = %e, "Failed to record remote history");
            }
        }

        let entry = HistoryEntry {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            artwork: track.artwork.clone(),
            played_at: Utc::now(),
        };
        if let Err(e) = self.history.record(entry).await {
            warn!(id = %track.id, error = %e, "Failed to record local history");
        }
    }

    async fn capture_and_extend(&self, track: &QueueTrack, options: &PlayOptions, generation: u64) {
        if track.is_remote() {
            if let Err(e) = self.capture_stream(track).await {
                warn!(id = %track.id, error = %e, "Failed to cache streamed audio");
            }
        }

        if options.requires_local() {
            return;
        }

        match self.should_extend(options.preserve_queue).await {
            Ok(true) => {
                if let Err(e) = self.extender.extend(&track.id, generation).await {
                    warn!(id = %track.id, error = %e, "Queue extension failed");
                }
            }
            Ok(false) => debug!(id = %track.id, "Queue extension not needed"),
            Err(e) => warn!(id = %track.id, error = %e, "Failed to inspect queue"),
        }
    }

    // Persist the just-streamed audio for fast replay.
    async fn capture_stream(&self, track: &QueueTrack) -> Result<()> {
        let loc = self.paths.resolve(&track.id).await?;
        if self.fs.exists(&loc.cache.audio).await? {
            return Ok(());
        }

        let audio = self.http.fetch_bytes(&track.url).await?;
        self.fs.write_file(&loc.cache.audio, audio).await?;
        debug!(id = %track.id, "Cached streamed audio");
        Ok(())
    }

    /// Extend on a fresh (non-preserving) play, or when the active index
    /// is within the configured threshold of the queue end.
    async fn should_extend(&self, preserve_queue: bool) -> Result<bool> {
        if !preserve_queue {
            return Ok(true);
        }

        let queue = self.engine.queue().await?;
        let active = self.engine.active_track_index().await?;
        Ok(active + self.config.extension_threshold >= queue.len().saturating_sub(1))
    }
}
