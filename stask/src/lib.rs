//! Stask: a single to-do list persisted to a local key-value store.
//!
//! The list manager is a reducer over [`TodoState`]. Every change to the
//! list is written to storage in full under the `"todos"` key before the
//! next action is accepted; UI-only changes (input text, edit buffer,
//! filter, delete confirmation) stay in memory.
//!
//! # Quick Start
//!
//! ```no_run
//! use stask::{load_state, TodoAction, TodoEnvironment, TodoReducer, TodoStore};
//! use stask_core::environment::UuidGenerator;
//! use stask_runtime::FileStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = Arc::new(FileStore::new("stask.json"));
//! let state = load_state(&*storage).await?;
//!
//! let env = TodoEnvironment::new(Arc::new(UuidGenerator), storage);
//! let store = TodoStore::new(state, TodoReducer::new(), env);
//!
//! store.send(TodoAction::AddTodo { text: "Buy milk".to_string() }).await?;
//!
//! let id = store.state(|s| s.todos[0].id.clone()).await;
//! store.send(TodoAction::ToggleComplete { id }).await?;
//!
//! println!("{}", store.state(stask::view::render).await);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod persistence;
pub mod reducer;
pub mod shell;
pub mod types;
pub mod view;

// Re-export commonly used types
pub use persistence::{load_state, load_todos, LoadError, TODOS_KEY};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use types::{EditSession, TodoAction, TodoId, TodoItem, TodoState};

/// Store running the todo reducer
pub type TodoStore = stask_runtime::Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;
