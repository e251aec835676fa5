//! # Playback & Cache Orchestration Engine
//!
//! Decides, for every playback request, whether to resolve a track from
//! persisted downloads, from the ephemeral cache, or from a live network
//! stream; extends the play queue from a recommendation continuation in
//! the background without blocking playback; and runs an idempotent
//! download pipeline for explicit offline persistence.
//!
//! ## Overview
//!
//! The engine is built against the platform abstractions in
//! `bridge-traits`:
//! - [`PlayerService`] is the public surface consumed by UI collaborators
//! - [`StateStore`] propagates state changes to synchronous observers
//! - [`CachePaths`] maps track ids to their on-disk asset locations
//! - [`DownloadManager`] persists tracks for offline playback
//! - [`QueueExtender`] appends recommendation continuations, guarded
//!   against staleness by a session generation counter
//! - [`HistoryLog`] keeps the capped local listening history

pub mod config;
pub mod download;
pub mod error;
pub mod history;
pub mod paths;
pub mod player;
pub mod queue;
pub mod state;
mod tasks;

#[cfg(test)]
pub(crate) mod testutil;

pub use config::PlayerConfig;
pub use download::DownloadManager;
pub use error::{PlaybackError, Result};
pub use history::{HistoryEntry, HistoryLog};
pub use paths::{CachePaths, TrackFiles, TrackLocations};
pub use player::{PlayOptions, PlayerService};
pub use queue::QueueExtender;
pub use state::{PlayerState, StateStore, StateUpdate, Subscription};
