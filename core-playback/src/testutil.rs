//! In-memory filesystem fake shared by the unit tests in this crate.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result};
use bridge_traits::storage::{FileMetadata, FileSystemAccess};
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub(crate) struct MemFs {
    files: Mutex<HashMap<PathBuf, Bytes>>,
    dirs: Mutex<HashSet<PathBuf>>,
}

impl MemFs {
    pub(crate) fn new() -> Self {
        let mut dirs = HashSet::new();
        dirs.insert(PathBuf::from("/cache"));
        dirs.insert(PathBuf::from("/data"));
        Self {
            files: Mutex::new(HashMap::new()),
            dirs: Mutex::new(dirs),
        }
    }

    pub(crate) fn insert(&self, path: impl Into<PathBuf>, data: impl Into<Bytes>) {
        self.files.lock().insert(path.into(), data.into());
    }

    pub(crate) fn contains(&self, path: &Path) -> bool {
        self.files.lock().contains_key(path)
    }

    fn not_found(path: &Path) -> BridgeError {
        BridgeError::Io(std::io::Error::new(
            ErrorKind::NotFound,
            format!("no such file: {}", path.display()),
        ))
    }
}

#[async_trait]
impl FileSystemAccess for MemFs {
    async fn get_cache_directory(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("/cache"))
    }

    async fn get_data_directory(&self) -> Result<PathBuf> {
        Ok(PathBuf::from("/data"))
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        Ok(self.files.lock().contains_key(path) || self.dirs.lock().contains(path))
    }

    async fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        if let Some(data) = self.files.lock().get(path) {
            return Ok(FileMetadata {
                size: data.len() as u64,
                modified_at: None,
                is_directory: false,
            });
        }
        if self.dirs.lock().contains(path) {
            return Ok(FileMetadata {
                size: 0,
                modified_at: None,
                is_directory: true,
            });
        }
        Err(Self::not_found(path))
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.dirs.lock().insert(path.to_path_buf());
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Bytes> {
        self.files
            .lock()
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))
    }

    async fn write_file(&self, path: &Path, data: Bytes) -> Result<()> {
        self.files.lock().insert(path.to_path_buf(), data);
        Ok(())
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        let data = self
            .files
            .lock()
            .get(from)
            .cloned()
            .ok_or_else(|| Self::not_found(from))?;
        self.files.lock().insert(to.to_path_buf(), data);
        Ok(())
    }

    async fn delete_file(&self, path: &Path) -> Result<()> {
        self.files
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(path))
    }

    async fn list_directory(&self, path: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .files
            .lock()
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }
}
