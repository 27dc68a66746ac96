//! File-per-key local storage.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::dirs::{AppDir, resolve_app_dir};

/// Durable key/value storage backed by one file per key.
///
/// Writes go to a temporary sibling first and are renamed over the target,
/// so readers only ever see a complete value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub struct LocalStorage {
    /// Directory holding one file per key.
    root: PathBuf,
}

impl LocalStorage {
    /// Opens (or creates) the storage directory.
    ///
    /// - If `dir` is `Some`, uses `{dir}`.
    /// - Otherwise uses `$XDG_DATA_HOME/cinecat` or `~/.local/share/cinecat`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined or the
    /// directory cannot be created.
    pub fn open(dir: Option<&PathBuf>) -> Result<Self> {
        let root = resolve_app_dir(dir, AppDir::Data)?;
        std::fs::create_dir_all(&root)
            .with_context(|| format!("failed to create directory {}", root.display()))?;
        Ok(Self { root })
    }

    /// Returns the storage directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    fn item_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Reads the value stored under `key`. Returns `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.item_path(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Reads the raw bytes stored under `key`. Returns `None` if absent.
    ///
    /// Unlike [`get_item`](Self::get_item) the content need not be UTF-8.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub fn get_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.item_path(key);
        match std::fs::read(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary file cannot be written or renamed.
    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.item_path(key);
        let tmp_path = self.root.join(format!(".{key}.tmp"));
        std::fs::write(&tmp_path, value)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        std::fs::rename(&tmp_path, &path)
            .with_context(|| format!("failed to replace {}", path.display()))?;
        tracing::debug!(key, bytes = value.len(), "storage item written");
        Ok(())
    }

    /// Deletes the value stored under `key`. Absent keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.item_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("failed to remove {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_open_creates_directory() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("data");

        // Act
        let storage = LocalStorage::open(Some(&nested)).unwrap();

        // Assert
        assert!(nested.is_dir());
        assert_eq!(storage.root(), nested.as_path());
    }

    #[test]
    fn test_get_absent_key() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(Some(&dir.path().to_path_buf())).unwrap();

        // Act
        let value = storage.get_item("missing").unwrap();

        // Assert
        assert!(value.is_none());
    }

    #[test]
    fn test_set_then_get_overwrites() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(Some(&dir.path().to_path_buf())).unwrap();

        // Act
        storage.set_item("greeting", "hola").unwrap();
        storage.set_item("greeting", "chau").unwrap();

        // Assert
        assert_eq!(storage.get_item("greeting").unwrap().as_deref(), Some("chau"));
        assert!(!dir.path().join(".greeting.tmp").exists());
    }

    #[test]
    fn test_remove_item() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(Some(&dir.path().to_path_buf())).unwrap();
        storage.set_item("k", "v").unwrap();

        // Act
        storage.remove_item("k").unwrap();
        storage.remove_item("k").unwrap();

        // Assert
        assert!(storage.get_item("k").unwrap().is_none());
    }

    #[test]
    fn test_get_bytes_accepts_non_utf8() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::open(Some(&dir.path().to_path_buf())).unwrap();
        std::fs::write(dir.path().join("raw"), [0xff, 0xfe]).unwrap();

        // Act
        let bytes = storage.get_bytes("raw").unwrap();

        // Assert
        assert_eq!(bytes.as_deref(), Some([0xff, 0xfe].as_slice()));
        assert!(storage.get_bytes("missing").unwrap().is_none());
    }

}
