//! File-backed PersistentStore implementation.

use confab_core::error::{ChatError, Result};
use confab_core::store::PersistentStore;
use std::fs;
use std::path::{Path, PathBuf};

/// A key/value store keeping one JSON file per key.
///
/// Directory structure:
/// ```text
/// base_dir/
/// ├── chat_sessions.json
/// └── current_chat_session.json
/// ```
pub struct JsonFileStore {
    base_dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at the given directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(|e| {
            ChatError::persistence(format!(
                "Failed to create data directory at {:?}: {}",
                base_dir, e
            ))
        })?;
        Ok(Self { base_dir })
    }

    /// Creates a store at the default location (~/.confab).
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// directory cannot be created.
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| ChatError::persistence("Failed to get home directory"))?;
        Self::new(home_dir.join(".confab"))
    }

    /// Returns the file path for a given key.
    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }
}

impl PersistentStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ChatError::persistence(format!(
                "Failed to read {:?}: {}",
                path, e
            ))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        fs::write(&path, value)
            .map_err(|e| ChatError::persistence(format!("Failed to write {:?}: {}", path, e)))
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        if path.exists() {
            fs::remove_file(&path)
                .map_err(|e| ChatError::persistence(format!("Failed to delete {:?}: {}", path, e)))?;
        }
        Ok(())
    }
}
