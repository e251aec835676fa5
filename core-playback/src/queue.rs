//! # Queue Extender
//!
//! Fetches a recommendation continuation for the seed track and appends
//! the recommended tracks to the native engine's queue one by one. Appends
//! are strictly sequential: the backend returns an ordered list and the
//! engine expects ordered appends, and resolving in parallel would multiply
//! network load by the playlist length.
//!
//! Staleness: the caller captures the store generation when it spawns the
//! extension. The generation is re-checked before every append, so the
//! instant a newer playback session starts, the remaining loop aborts.
//! The abort is silent; it is the normal outcome of a user changing
//! tracks while a continuation is in flight.

use bridge_traits::catalog::CatalogService;
use bridge_traits::engine::{PlayerEngine, QueueTrack};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::state::{StateStore, StateUpdate};

pub struct QueueExtender {
    catalog: Arc<dyn CatalogService>,
    engine: Arc<dyn PlayerEngine>,
    state: StateStore,
}

impl QueueExtender {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        engine: Arc<dyn PlayerEngine>,
        state: StateStore,
    ) -> Self {
        Self {
            catalog,
            engine,
            state,
        }
    }

    /// Extend the engine queue with the continuation seeded by `seed_id`.
    ///
    /// `generation` is the store generation captured when the extension
    /// was scheduled; a mismatch at any point aborts the remaining work.
    pub async fn extend(&self, seed_id: &str, generation: u64) -> Result<()> {
        let playlist = self.catalog.get_watch_playlist(seed_id).await?;

        if self.state.generation() != generation {
            debug!(seed = seed_id, "Continuation superseded before it began");
            return Ok(());
        }

        self.state
            .apply(StateUpdate::new().token(Some(playlist.playlist_id.clone())));

        info!(
            seed = seed_id,
            playlist = %playlist.playlist_id,
            tracks = playlist.tracks.len(),
            "Extending queue from continuation"
        );

        // The first entry is the seed, which is already playing.
        for track in playlist.tracks.iter().skip(1) {
            if self.state.generation() != generation {
                debug!(seed = seed_id, "Continuation superseded, stopping appends");
                return Ok(());
            }

            let stream = self.catalog.stream_music(&track.id).await?;
            self.engine
                .add_to_queue(QueueTrack {
                    id: track.id.clone(),
                    url: stream.url,
                    title: track.title.clone(),
                    artist: track.artist.clone(),
                    artwork: track.artwork_url.clone(),
                    duration: None,
                })
                .await?;
            self.state.notify();
        }

        Ok(())
    }
}
