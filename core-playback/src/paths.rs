//! # Cache Path Resolver
//!
//! Computes deterministic file locations for a track's audio, metadata and
//! artwork under the two storage roots the engine manages: the ephemeral
//! cache root and the persistent downloads root. Each track id maps to a
//! triple of sibling files, `{id}.mp3`, `{id}.json` and `{id}.jpg`.
//!
//! Directory creation is lazy and memoized: the first resolution in a
//! process lifetime ensures both roots exist, later resolutions skip the
//! filesystem round trip. The memo is a performance device only; a
//! directory removed externally surfaces as a later I/O error, not here.

use bridge_traits::storage::FileSystemAccess;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::PlayerConfig;
use crate::error::Result;

const AUDIO_EXT: &str = "mp3";
const META_EXT: &str = "json";
const ART_EXT: &str = "jpg";

/// The three sibling files of one track under one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackFiles {
    pub audio: PathBuf,
    pub meta: PathBuf,
    pub art: PathBuf,
}

impl TrackFiles {
    fn under(root: &Path, id: &str) -> Self {
        Self {
            audio: root.join(format!("{}.{}", id, AUDIO_EXT)),
            meta: root.join(format!("{}.{}", id, META_EXT)),
            art: root.join(format!("{}.{}", id, ART_EXT)),
        }
    }
}

/// Resolved locations of one track under both storage roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackLocations {
    pub cache: TrackFiles,
    pub downloads: TrackFiles,
}

/// Resolver for per-track asset paths.
pub struct CachePaths {
    fs: Arc<dyn FileSystemAccess>,
    cache_root: PathBuf,
    downloads_root: PathBuf,
    ensured: Mutex<HashSet<PathBuf>>,
}

impl CachePaths {
    /// Create a resolver rooted at the platform cache directory and the
    /// downloads subdirectory of the platform data directory.
    pub async fn new(fs: Arc<dyn FileSystemAccess>, config: &PlayerConfig) -> Result<Self> {
        let cache_root = fs.get_cache_directory().await?;
        let downloads_root = fs
            .get_data_directory()
            .await?
            .join(&config.downloads_dir_name);

        Ok(Self {
            fs,
            cache_root,
            downloads_root,
            ensured: Mutex::new(HashSet::new()),
        })
    }

    /// Resolve the asset locations for a track id, ensuring both roots
    /// exist on first use.
    pub async fn resolve(&self, id: &str) -> Result<TrackLocations> {
        self.ensure_dir(&self.cache_root).await?;
        self.ensure_dir(&self.downloads_root).await?;

        Ok(TrackLocations {
            cache: TrackFiles::under(&self.cache_root, id),
            downloads: TrackFiles::under(&self.downloads_root, id),
        })
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn downloads_root(&self) -> &Path {
        &self.downloads_root
    }

    async fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if self.ensured.lock().contains(dir) {
            return Ok(());
        }

        self.fs.create_dir_all(dir).await?;
        self.ensured.lock().insert(dir.to_path_buf());
        Ok(())
    }
}

/// Render a local path as a `file://` URI for the native engine.
pub fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}
