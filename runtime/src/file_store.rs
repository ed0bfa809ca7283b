//! JSON-file implementation of [`KeyValueStore`].
//!
//! The file holds a single JSON object mapping keys to string values, the
//! on-disk analogue of a browser's local storage. Each write rewrites the
//! whole document through a sibling temporary file that is renamed into
//! place, so a crash mid-write leaves the previous document intact.

use serde_json::Map;
use stask_core::storage::{KeyValueStore, StorageError, StorageFuture};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

type Document = BTreeMap<String, String>;

/// Key-value store persisted as a JSON object in a single file.
///
/// A missing or empty file reads as an empty store. Parent directories are
/// created on first write.
///
/// # Example
///
/// ```no_run
/// use stask_core::storage::KeyValueStore;
/// use stask_runtime::FileStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = FileStore::new("stask.json");
/// store.set("todos", "[]".to_string()).await?;
/// assert_eq!(store.get("todos").await?.as_deref(), Some("[]"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by the file at `path`.
    ///
    /// Nothing is touched on disk until the first read or write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn read_document(&self) -> Result<Document, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::trace!(
                    path = %self.path.display(),
                    "Storage file absent, reading as empty"
                );
                return Ok(Document::new());
            },
            Err(error) => return Err(StorageError::Io(error.to_string())),
        };

        if raw.trim().is_empty() {
            return Ok(Document::new());
        }

        let object: Map<String, serde_json::Value> = serde_json::from_str(&raw)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        object
            .into_iter()
            .map(|(key, value)| match value {
                serde_json::Value::String(text) => Ok((key, text)),
                other => Err(StorageError::Serialization(format!(
                    "value for key '{key}' is not a string: {other}"
                ))),
            })
            .collect()
    }

    async fn write_document(&self, document: &Document) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(document)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StorageError::Io(e.to_string()))?;
            }
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, json)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), keys = document.len(), "Storage file written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>> {
        Box::pin(async move {
            let mut document = self.read_document().await?;
            Ok(document.remove(key))
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            let _guard = self.write_lock.lock().await;
            let mut document = self.read_document().await?;
            document.insert(key.to_string(), value);
            self.write_document(&document).await
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));

        assert_eq!(store.get("todos").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));

        store.set("todos", r#"[{"id":"1"}]"#.to_string()).await.unwrap();

        assert_eq!(
            store.get("todos").await.unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
    }

    #[tokio::test]
    async fn set_overwrites_only_its_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store.json"));

        store.set("todos", "[]".to_string()).await.unwrap();
        store.set("theme", "dark".to_string()).await.unwrap();
        store.set("todos", "[1]".to_string()).await.unwrap();

        assert_eq!(store.get("todos").await.unwrap().as_deref(), Some("[1]"));
        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn values_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        FileStore::new(&path).set("todos", "[]".to_string()).await.unwrap();
        let reopened = FileStore::new(&path);

        assert_eq!(reopened.get("todos").await.unwrap().as_deref(), Some("[]"));
        assert!(!reopened.temp_path().exists());
    }

    #[tokio::test]
    async fn corrupt_document_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json").unwrap();

        let result = FileStore::new(&path).get("todos").await;

        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[tokio::test]
    async fn non_string_value_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, r#"{"todos": [1, 2]}"#).unwrap();

        let result = FileStore::new(&path).get("todos").await;

        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }
}
