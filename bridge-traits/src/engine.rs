//! Native Playback Engine Abstraction
//!
//! The native engine owns the ordered play queue and the audio pipeline.
//! Its queue is the single source of truth for "what plays next"; the
//! orchestration core never mirrors it, it only reads it back when making
//! extension decisions. Hosts back this trait with whatever media engine
//! their platform provides (a media-session service on mobile, an audio
//! sink on desktop, an in-memory fake in tests).

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// A single entry of the native engine's queue.
///
/// Constructed fresh on every resolution; the orchestration core never
/// retains one beyond the call that uses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueTrack {
    /// Stable track identifier.
    pub id: String,
    /// Playable source URI: either a `file://` path or a remote stream URL.
    pub url: String,
    pub title: String,
    pub artist: String,
    /// Artwork URI: a `file://` path or a remote URL.
    pub artwork: Option<String>,
    pub duration: Option<Duration>,
}

impl QueueTrack {
    /// Whether the playable source is a remote stream rather than a local
    /// file.
    pub fn is_remote(&self) -> bool {
        self.url.starts_with("http")
    }
}

/// Coarse playback state reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Playing,
    Paused,
    Stopped,
}

/// Queue-based native playback engine.
///
/// All operations are async because they cross a host boundary (media
/// service, audio thread). Implementations must be safe to call from
/// multiple tasks; the core serializes semantically conflicting calls
/// itself.
#[async_trait]
pub trait PlayerEngine: Send + Sync {
    /// Discard the entire queue and stop any current playback.
    async fn reset_queue(&self) -> Result<()>;

    /// Replace the queue with the given tracks.
    async fn set_queue(&self, tracks: Vec<QueueTrack>) -> Result<()>;

    /// Append a track at the end of the queue.
    async fn add_to_queue(&self, track: QueueTrack) -> Result<()>;

    /// Start or resume playback of the active track.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the queue and position.
    async fn pause(&self) -> Result<()>;

    /// Advance to the next queue entry.
    async fn skip_to_next(&self) -> Result<()>;

    /// Return to the previous queue entry.
    async fn skip_to_previous(&self) -> Result<()>;

    /// Jump to an absolute queue index.
    async fn skip_to_index(&self, index: usize) -> Result<()>;

    /// Snapshot of the current queue, in order.
    async fn queue(&self) -> Result<Vec<QueueTrack>>;

    /// Index of the currently active track within the queue.
    async fn active_track_index(&self) -> Result<usize>;

    /// Current coarse playback state.
    async fn playback_state(&self) -> Result<EngineState>;
}
