//! Domain types for the to-do list.
//!
//! A list is an ordered sequence of items plus the transient UI state the
//! reducer needs to interpret user intent (the single edit session, the
//! single armed delete, the completed-items filter). Only the items are
//! ever persisted.

use stask_core::{Deserialize, Serialize};
use stask_macros::Action;

/// Unique identifier for a todo item
///
/// Opaque to the list manager; serialized as a bare JSON string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wraps an identifier string
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TodoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Unique identifier, never reused
    pub id: TodoId,
    /// User-supplied text
    pub text: String,
    /// Whether the todo is finished
    pub completed: bool,
}

impl TodoItem {
    /// Creates a new, unfinished todo item
    #[must_use]
    pub const fn new(id: TodoId, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }

    /// Flips the completed flag
    pub const fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

/// The item currently being edited and its unsaved text
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditSession {
    /// Item under edit
    pub id: TodoId,
    /// Text typed so far, seeded with the item's text
    pub buffer: String,
}

/// State of the todo list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoState {
    /// All todos in insertion order
    pub todos: Vec<TodoItem>,
    /// Text in the new-todo input
    pub input: String,
    /// At most one item is edited at a time
    pub editing: Option<EditSession>,
    /// At most one item awaits delete confirmation
    pub pending_delete: Option<TodoId>,
    /// When false, completed todos are hidden from [`TodoState::visible`]
    pub show_completed: bool,
    /// Last persistence failure, cleared by the next mutation
    pub last_error: Option<String>,
}

impl Default for TodoState {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoState {
    /// Creates a new empty todo state
    #[must_use]
    pub const fn new() -> Self {
        Self {
            todos: Vec::new(),
            input: String::new(),
            editing: None,
            pending_delete: None,
            show_completed: true,
            last_error: None,
        }
    }

    /// Creates a state holding previously loaded todos
    #[must_use]
    pub fn with_todos(todos: Vec<TodoItem>) -> Self {
        Self {
            todos,
            ..Self::new()
        }
    }

    /// Returns the number of todos, ignoring the filter
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    /// True when there are no todos at all, ignoring the filter
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&TodoItem> {
        self.todos.iter().find(|t| &t.id == id)
    }

    /// Returns a mutable todo by ID
    pub fn get_mut(&mut self, id: &TodoId) -> Option<&mut TodoItem> {
        self.todos.iter_mut().find(|t| &t.id == id)
    }

    /// Checks if a todo exists
    #[must_use]
    pub fn exists(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }

    /// Todos to display, in insertion order
    ///
    /// Completed todos are skipped unless `show_completed` is set. The
    /// underlying list is never modified.
    pub fn visible(&self) -> impl Iterator<Item = &TodoItem> + '_ {
        let show_completed = self.show_completed;
        self.todos
            .iter()
            .filter(move |t| show_completed || !t.completed)
    }

    /// True if `id` is the item under edit
    #[must_use]
    pub fn is_editing(&self, id: &TodoId) -> bool {
        self.editing.as_ref().is_some_and(|session| &session.id == id)
    }

    /// True if `id` is armed for deletion
    #[must_use]
    pub fn is_pending_delete(&self, id: &TodoId) -> bool {
        self.pending_delete.as_ref() == Some(id)
    }
}

/// Actions the todo reducer understands
///
/// Commands carry user intent from the UI. Events are fed back by effects.
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Command: Replace the new-todo input text
    #[command]
    InputChanged {
        /// Current input text
        text: String,
    },

    /// Command: Append a todo (ignored when the text is blank)
    #[command]
    AddTodo {
        /// Text of the todo
        text: String,
    },

    /// Command: Start editing a todo
    #[command]
    BeginEdit {
        /// Todo to edit
        id: TodoId,
    },

    /// Command: Replace the edit buffer
    #[command]
    EditChanged {
        /// Current edit text
        text: String,
    },

    /// Command: Write the edit buffer to the todo under edit
    #[command]
    CommitEdit {
        /// Todo being saved
        id: TodoId,
    },

    /// Command: Abandon the edit session
    #[command]
    CancelEdit,

    /// Command: Flip a todo's completed flag
    #[command]
    ToggleComplete {
        /// Todo to toggle
        id: TodoId,
    },

    /// Command: Arm, or confirm, deletion of a todo
    #[command]
    RequestDelete {
        /// Todo to delete
        id: TodoId,
    },

    /// Command: Disarm the pending deletion
    #[command]
    CancelDelete,

    /// Command: Show or hide completed todos
    #[command]
    SetShowCompleted {
        /// Whether completed todos are visible
        show: bool,
    },

    // ========== Events ==========
    /// Event: Writing the list to storage failed
    #[event]
    PersistFailed {
        /// Error message
        error: String,
    },
}
