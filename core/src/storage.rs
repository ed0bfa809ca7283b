//! Key-value storage trait for persisting serialized state.
//!
//! The storage model is deliberately tiny: string keys map to string values,
//! a value is always read and written whole, and a missing key is not an
//! error. This mirrors a browser's local storage and is all the list manager
//! needs to mirror its items on every mutation.
//!
//! # Implementations
//!
//! - `FileStore` (in `stask-runtime`): JSON file on local disk
//! - `InMemoryStore` / `FailingStore` (in `stask-testing`): deterministic tests
//!
//! # Example
//!
//! ```no_run
//! use stask_core::storage::{KeyValueStore, StorageError};
//!
//! async fn example<S: KeyValueStore>(store: &S) -> Result<(), StorageError> {
//!     store.set("todos", "[]".to_string()).await?;
//!     let value = store.get("todos").await?;
//!     assert_eq!(value.as_deref(), Some("[]"));
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by [`KeyValueStore`] methods.
pub type StorageFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StorageError>> + Send + 'a>>;

/// Errors that can occur during storage operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing medium could not be read or written.
    #[error("I/O error: {0}")]
    Io(String),

    /// The backing medium holds data that is not a valid key-value document.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Key-value store abstraction.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so it can be held as `Arc<dyn KeyValueStore>` inside an environment and
/// captured by effects.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` when the key has never been written.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing medium cannot be read.
    fn get<'a>(&'a self, key: &'a str) -> StorageFuture<'a, Option<String>>;

    /// Overwrite the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the backing medium cannot be written.
    fn set<'a>(&'a self, key: &'a str, value: String) -> StorageFuture<'a, ()>;
}
