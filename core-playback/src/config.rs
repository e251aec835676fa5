//! Engine configuration

/// Configuration for the playback orchestration engine.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Name of the persistent downloads directory under the data root
    /// (default: "downloads")
    pub downloads_dir_name: String,

    /// Queue extension triggers when the active index is within this many
    /// tracks of the queue end (default: 2)
    pub extension_threshold: usize,

    /// Maximum number of retained local history entries (default: 100)
    pub history_limit: usize,

    /// Number of concurrent downloads allowed (default: 2)
    pub max_concurrent_downloads: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            downloads_dir_name: "downloads".to_string(),
            extension_threshold: 2,
            history_limit: 100,
            max_concurrent_downloads: 2,
        }
    }
}

impl PlayerConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the downloads directory name.
    pub fn with_downloads_dir(mut self, name: impl Into<String>) -> Self {
        self.downloads_dir_name = name.into();
        self
    }

    /// Set the queue extension threshold.
    pub fn with_extension_threshold(mut self, threshold: usize) -> Self {
        self.extension_threshold = threshold;
        self
    }

    /// Set the local history entry cap.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Set maximum concurrent downloads.
    pub fn with_max_concurrent_downloads(mut self, count: usize) -> Self {
        self.max_concurrent_downloads = count;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.downloads_dir_name.is_empty() {
            return Err("downloads_dir_name cannot be empty".to_string());
        }

        if self.history_limit == 0 {
            return Err("history_limit must be at least 1".to_string());
        }

        if self.max_concurrent_downloads == 0 {
            return Err("max_concurrent_downloads must be at least 1".to_string());
        }

        Ok(())
    }
}
