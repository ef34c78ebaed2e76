use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::TextbinError;

/// Key under which the browser store keeps the serialized bookmarks.
pub const LOCAL_STORAGE_KEY: &str = "savedDocs";

/// Where the serialized bookmark list lives.
///
/// The store only ever reads and writes the whole list as one string.
pub trait BookmarkBackend {
    /// The stored list, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<String>, TextbinError>;

    fn save(&self, data: &str) -> Result<(), TextbinError>;

    fn clear(&self) -> Result<(), TextbinError>;
}

/// A JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn storage_err(&self, e: std::io::Error) -> TextbinError {
        TextbinError::Storage(format!("{}: {e}", self.path.display()))
    }
}

impl BookmarkBackend for FileBackend {
    fn load(&self) -> Result<Option<String>, TextbinError> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.storage_err(e)),
        }
    }

    fn save(&self, data: &str) -> Result<(), TextbinError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.storage_err(e))?;
        }
        std::fs::write(&self.path, data).map_err(|e| self.storage_err(e))
    }

    fn clear(&self) -> Result<(), TextbinError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.storage_err(e)),
        }
    }
}

/// Keeps the list in memory only.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: Mutex<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn data(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BookmarkBackend for MemoryBackend {
    fn load(&self) -> Result<Option<String>, TextbinError> {
        Ok(self.data().clone())
    }

    fn save(&self, data: &str) -> Result<(), TextbinError> {
        *self.data() = Some(data.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), TextbinError> {
        *self.data() = None;
        Ok(())
    }
}

/// The browser's `localStorage`.
///
/// Only available when the `hydrate` feature is enabled.
#[cfg(feature = "hydrate")]
#[derive(Debug, Clone)]
pub struct LocalStorageBackend {
    key: String,
}

#[cfg(feature = "hydrate")]
impl Default for LocalStorageBackend {
    fn default() -> Self {
        Self {
            key: LOCAL_STORAGE_KEY.to_string(),
        }
    }
}

#[cfg(feature = "hydrate")]
impl LocalStorageBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn storage(&self) -> Result<web_sys::Storage, TextbinError> {
        web_sys::window()
            .ok_or_else(|| TextbinError::Storage("No browser window".into()))?
            .local_storage()
            .map_err(|e| TextbinError::Storage(format!("localStorage unavailable: {e:?}")))?
            .ok_or_else(|| TextbinError::Storage("localStorage unavailable".into()))
    }
}

#[cfg(feature = "hydrate")]
impl BookmarkBackend for LocalStorageBackend {
    fn load(&self) -> Result<Option<String>, TextbinError> {
        self.storage()?
            .get_item(&self.key)
            .map_err(|e| TextbinError::Storage(format!("{e:?}")))
    }

    fn save(&self, data: &str) -> Result<(), TextbinError> {
        self.storage()?
            .set_item(&self.key, data)
            .map_err(|e| TextbinError::Storage(format!("{e:?}")))
    }

    fn clear(&self) -> Result<(), TextbinError> {
        self.storage()?
            .remove_item(&self.key)
            .map_err(|e| TextbinError::Storage(format!("{e:?}")))
    }
}
