//! Reading and writing the todo list through a [`KeyValueStore`].
//!
//! The whole list lives under one key as a JSON array of
//! `{"id", "text", "completed"}` objects and is rewritten on every change.

use crate::types::{TodoItem, TodoState};
use stask_core::storage::{KeyValueStore, StorageError};
use std::collections::HashSet;
use thiserror::Error;

/// Storage key holding the serialized list
pub const TODOS_KEY: &str = "todos";

/// Errors that can occur while loading the list at startup
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The store could not be read
    #[error("Failed to read stored todos: {0}")]
    Storage(#[from] StorageError),

    /// The stored value is not a JSON array of todos
    #[error("Stored todos are malformed: {0}")]
    Malformed(String),
}

/// Serialize the list exactly as it is written to storage
///
/// # Errors
///
/// Returns the `serde_json` error if serialization fails.
pub fn serialize_todos(todos: &[TodoItem]) -> Result<String, serde_json::Error> {
    serde_json::to_string(todos)
}

/// Parse a stored list
///
/// An empty value reads as an empty list. Items repeating an earlier id are
/// dropped so ids stay unique.
///
/// # Errors
///
/// Returns [`LoadError::Malformed`] if `raw` is not a JSON array of todos.
pub fn deserialize_todos(raw: &str) -> Result<Vec<TodoItem>, LoadError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parsed: Vec<TodoItem> =
        serde_json::from_str(raw).map_err(|e| LoadError::Malformed(e.to_string()))?;

    let mut seen = HashSet::with_capacity(parsed.len());
    let mut todos = Vec::with_capacity(parsed.len());
    for item in parsed {
        if seen.insert(item.id.clone()) {
            todos.push(item);
        } else {
            tracing::warn!(id = %item.id, "Dropping stored todo with duplicate id");
        }
    }

    Ok(todos)
}

/// Load the list from storage
///
/// A missing key yields an empty list.
///
/// # Errors
///
/// Returns [`LoadError::Storage`] if the store cannot be read and
/// [`LoadError::Malformed`] if the stored value cannot be parsed.
pub async fn load_todos(storage: &dyn KeyValueStore) -> Result<Vec<TodoItem>, LoadError> {
    let todos = match storage.get(TODOS_KEY).await? {
        Some(raw) => deserialize_todos(&raw)?,
        None => Vec::new(),
    };

    tracing::info!(count = todos.len(), "Loaded todos");
    Ok(todos)
}

/// Load the list from storage into a fresh [`TodoState`]
///
/// # Errors
///
/// See [`load_todos`].
pub async fn load_state(storage: &dyn KeyValueStore) -> Result<TodoState, LoadError> {
    Ok(TodoState::with_todos(load_todos(storage).await?))
}
