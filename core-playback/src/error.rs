//! # Playback Error Types
//!
//! Error taxonomy for the orchestration engine. Only resolution failures
//! and offline-unavailable failures surface to callers; cache writes and
//! background work log and swallow their own errors.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback orchestration.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Resolution Errors
    // ========================================================================
    /// Local or remote metadata document could not be parsed.
    #[error("Invalid metadata for track {id}: {reason}")]
    InvalidMetadata { id: String, reason: String },

    // ========================================================================
    // Offline Errors
    // ========================================================================
    /// A locality-restricted play request found no local audio asset.
    ///
    /// Fatal to that request; no network fallback is attempted.
    #[error("Track not available offline: {0}")]
    OfflineUnavailable(String),

    // ========================================================================
    // Cache/Download Errors
    // ========================================================================
    /// Cache or download pipeline failure.
    #[error("Cache error: {0}")]
    CacheError(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Engine configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Failure crossing a platform bridge (engine, filesystem, HTTP).
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PlaybackError {
    /// Returns `true` if this error means a required local asset was
    /// missing in an offline-restricted mode.
    pub fn is_offline_unavailable(&self) -> bool {
        matches!(self, PlaybackError::OfflineUnavailable(_))
    }

    /// Returns `true` if this error originated in a remote collaborator
    /// and the operation may succeed on retry.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::Bridge(BridgeError::HttpStatus { .. })
                | PlaybackError::Bridge(BridgeError::OperationFailed(_))
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;
