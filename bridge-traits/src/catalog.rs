//! Catalog / Stream Resolution Service Abstraction
//!
//! The remote catalog is the single network dependency of the orchestration
//! engine: it resolves track metadata, short-lived stream URLs, and
//! recommendation ("radio") continuations, and records remote play history.
//! The wire protocol is opaque to the core; implementations translate
//! whatever transport they use into the typed payloads below.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Metadata document for a single track, as returned by the catalog.
///
/// This is the payload persisted verbatim as the `{id}.json` sibling of a
/// cached audio file, so it must serde round-trip losslessly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongMetadata {
    /// Stable track identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Artist display name.
    pub artist: String,
    /// Remote artwork URL, when the catalog provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
    /// Track duration in seconds, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
}

/// A resolved, playable stream location.
///
/// Stream URLs are typically short-lived; they are requested immediately
/// before playback or capture and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamSource {
    pub url: String,
}

/// One entry of a recommendation continuation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artwork_url: Option<String>,
}

/// A recommendation continuation seeded by a track.
///
/// `playlist_id` is the opaque continuation identifier the engine stores to
/// correlate a queue-extension fetch with the playback session that
/// requested it. The track list is ordered; the first entry is the seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchPlaylist {
    pub playlist_id: String,
    pub tracks: Vec<WatchTrack>,
}

/// Remote catalog and stream-resolution service.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::catalog::CatalogService;
///
/// async fn resolve(catalog: &dyn CatalogService, id: &str) -> Result<String> {
///     let song = catalog.get_song(id).await?;
///     let stream = catalog.stream_music(id).await?;
///     Ok(format!("{} ({})", song.title, stream.url))
/// }
/// ```
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch the metadata document for a track.
    async fn get_song(&self, id: &str) -> Result<SongMetadata>;

    /// Resolve a fresh, playable stream URL for a track.
    async fn stream_music(&self, id: &str) -> Result<StreamSource>;

    /// Fetch a recommendation continuation seeded by a track.
    ///
    /// The returned list is ordered and includes the seed as its first
    /// entry.
    async fn get_watch_playlist(&self, seed_id: &str) -> Result<WatchPlaylist>;

    /// Record a play in the remote listening history.
    async fn add_history(&self, id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn song_metadata_round_trips() {
        let song = SongMetadata {
            id: "v1".to_string(),
            title: "Test Track".to_string(),
            artist: "Test Artist".to_string(),
            artwork_url: Some("https://img.example.com/v1.jpg".to_string()),
            duration_secs: Some(184),
        };

        let json = serde_json::to_string(&song).unwrap();
        let back: SongMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, song);
    }

    #[test]
    fn song_metadata_tolerates_missing_optionals() {
        let json = r#"{"id":"v2","title":"Sparse","artist":"Nobody"}"#;
        let song: SongMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(song.artwork_url, None);
        assert_eq!(song.duration_secs, None);
    }
}
