//! In-memory key-value stores for persistence tests
//!
//! - [`InMemoryStore`]: `HashMap`-backed store that records every write
//! - [`FailingStore`]: store whose operations always fail

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use stask_core::storage::{KeyValueStore, StorageError, StorageFuture};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory key-value store for fast, deterministic testing.
///
/// Clones share the same data, so a test can hand one clone to the
/// environment and inspect another.
///
/// # Example
///
/// ```
/// use stask_testing::InMemoryStore;
/// use stask_core::storage::KeyValueStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryStore::new();
/// store.set("todos", "[]".to_string()).await?;
///
/// assert_eq!(store.value("todos").as_deref(), Some("[]"));
/// assert_eq!(store.write_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<HashMap<String, String>>>,
    writes: Arc<RwLock<Vec<(String, String)>>>,
}

impl InMemoryStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with one value
    ///
    /// Seeding does not count as a write.
    #[must_use]
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let store = Self::new();
        store
            .data
            .write()
            .unwrap()
            .insert(key.to_string(), value.into());
        store
    }

    /// Current value stored under `key`
    #[must_use]
    pub fn value(&self, key: &str) -> Option<String> {
        self.data.read().unwrap().get(key).cloned()
    }

    /// Number of `set` calls received so far
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.read().unwrap().len()
    }

    /// Every `set` call received so far, oldest first
    #[must_use]
    pub fn writes(&self) -> Vec<(String, String)> {
        self.writes.read().unwrap().clone()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>> {
        Box::pin(async move { Ok(self.value(key)) })
    }

    fn set<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.writes
                .write()
                .unwrap()
                .push((key.to_string(), value.clone()));
            self.data.write().unwrap().insert(key.to_string(), value);
            Ok(())
        })
    }
}

/// Key-value store whose writes (and optionally reads) always fail.
///
/// Reads succeed with no value unless built with [`FailingStore::unreadable`].
#[derive(Clone, Debug)]
pub struct FailingStore {
    error: StorageError,
    fail_reads: bool,
}

impl FailingStore {
    /// Store that rejects every write with `error`
    #[must_use]
    pub const fn new(error: StorageError) -> Self {
        Self {
            error,
            fail_reads: false,
        }
    }

    /// Store that rejects every read and write with `error`
    #[must_use]
    pub const fn unreadable(error: StorageError) -> Self {
        Self {
            error,
            fail_reads: true,
        }
    }
}

impl KeyValueStore for FailingStore {
    fn get<'a>(&'a self, _key: &'a str) -> StorageFuture<'a, Option<String>> {
        Box::pin(async move {
            if self.fail_reads {
                Err(self.error.clone())
            } else {
                Ok(None)
            }
        })
    }

    fn set<'a>(&'a self, _key: &'a str, _value: String) -> StorageFuture<'a, ()> {
        Box::pin(async move { Err(self.error.clone()) })
    }
}
