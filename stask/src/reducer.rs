//! Reducer logic for the todo list.
//!
//! Every change to the list is followed by a persistence effect that writes
//! the whole list under [`TODOS_KEY`]. UI-only changes (input text, edit
//! buffer, filter, delete arming) never touch storage.

use crate::persistence::{serialize_todos, TODOS_KEY};
use crate::types::{EditSession, TodoAction, TodoId, TodoItem, TodoState};
use stask_core::{
    effect::Effect, environment::IdGenerator, reducer::Reducer, smallvec, storage::KeyValueStore,
    SmallVec,
};
use std::sync::Arc;

/// Attempts at drawing an unused id before an add is abandoned
const ID_ATTEMPTS: usize = 16;

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Source of fresh todo ids
    pub ids: Arc<dyn IdGenerator>,
    /// Where the list is persisted
    pub storage: Arc<dyn KeyValueStore>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self { ids, storage }
    }
}

/// Reducer for the todo list
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Describes a write of the full list to storage
    fn persist(state: &TodoState, env: &TodoEnvironment) -> Effect<TodoAction> {
        let json = match serialize_todos(&state.todos) {
            Ok(json) => json,
            Err(error) => {
                let error = error.to_string();
                return Effect::future(async move { Some(TodoAction::PersistFailed { error }) });
            },
        };

        let storage = Arc::clone(&env.storage);
        Effect::future(async move {
            match storage.set(TODOS_KEY, json).await {
                Ok(()) => None,
                Err(error) => Some(TodoAction::PersistFailed {
                    error: error.to_string(),
                }),
            }
        })
    }

    /// Draws an id not already used by the list
    fn fresh_id(state: &TodoState, env: &TodoEnvironment) -> Option<TodoId> {
        (0..ID_ATTEMPTS)
            .map(|_| TodoId::new(env.ids.next_id()))
            .find(|id| !state.exists(id))
    }

    fn add(
        state: &mut TodoState,
        text: String,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        if text.trim().is_empty() {
            tracing::debug!("Ignoring blank todo");
            return SmallVec::new();
        }

        let Some(id) = Self::fresh_id(state, env) else {
            tracing::error!(
                attempts = ID_ATTEMPTS,
                "Id generator kept returning ids already in use"
            );
            state.last_error = Some("could not allocate a unique todo id".to_string());
            return SmallVec::new();
        };

        tracing::debug!(%id, "Adding todo");
        state.todos.push(TodoItem::new(id, text));
        state.input.clear();
        state.last_error = None;
        smallvec![Self::persist(state, env)]
    }

    fn begin_edit(
        state: &mut TodoState,
        id: TodoId,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        let Some(item) = state.get(&id) else {
            tracing::debug!(%id, "Ignoring edit of unknown todo");
            return SmallVec::new();
        };

        state.editing = Some(EditSession {
            buffer: item.text.clone(),
            id,
        });
        state.last_error = None;
        // Nothing changed yet, but the list is saved on entering edit mode too.
        smallvec![Self::persist(state, env)]
    }

    fn commit_edit(
        state: &mut TodoState,
        id: TodoId,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        let Some(session) = state.editing.take_if(|session| session.id == id) else {
            tracing::debug!(%id, "Ignoring save for a todo that is not being edited");
            return SmallVec::new();
        };

        let Some(item) = state.get_mut(&id) else {
            tracing::debug!(%id, "Dropping edit of a todo that no longer exists");
            return SmallVec::new();
        };

        item.text = session.buffer;
        state.last_error = None;
        smallvec![Self::persist(state, env)]
    }

    fn toggle(
        state: &mut TodoState,
        id: &TodoId,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        let Some(item) = state.get_mut(id) else {
            tracing::debug!(%id, "Ignoring toggle of unknown todo");
            return SmallVec::new();
        };

        item.toggle();
        state.last_error = None;
        smallvec![Self::persist(state, env)]
    }

    fn request_delete(
        state: &mut TodoState,
        id: TodoId,
        env: &TodoEnvironment,
    ) -> SmallVec<[Effect<TodoAction>; 4]> {
        if !state.exists(&id) {
            tracing::debug!(%id, "Ignoring delete of unknown todo");
            return SmallVec::new();
        }

        if !state.is_pending_delete(&id) {
            tracing::debug!(%id, "Delete armed, waiting for confirmation");
            state.pending_delete = Some(id);
            return SmallVec::new();
        }

        tracing::debug!(%id, "Deleting todo");
        state.todos.retain(|t| t.id != id);
        state.pending_delete = None;
        if state.is_editing(&id) {
            state.editing = None;
        }
        state.last_error = None;
        smallvec![Self::persist(state, env)]
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(action = action.name(), "Reducing todo action");

        match action {
            // ========== Commands ==========
            TodoAction::InputChanged { text } => {
                state.input = text;
                SmallVec::new()
            },

            TodoAction::AddTodo { text } => Self::add(state, text, env),

            TodoAction::BeginEdit { id } => Self::begin_edit(state, id, env),

            TodoAction::EditChanged { text } => {
                if let Some(session) = state.editing.as_mut() {
                    session.buffer = text;
                }
                SmallVec::new()
            },

            TodoAction::CommitEdit { id } => Self::commit_edit(state, id, env),

            TodoAction::CancelEdit => {
                state.editing = None;
                SmallVec::new()
            },

            TodoAction::ToggleComplete { id } => Self::toggle(state, &id, env),

            TodoAction::RequestDelete { id } => Self::request_delete(state, id, env),

            TodoAction::CancelDelete => {
                state.pending_delete = None;
                SmallVec::new()
            },

            TodoAction::SetShowCompleted { show } => {
                state.show_completed = show;
                SmallVec::new()
            },

            // ========== Events ==========
            TodoAction::PersistFailed { ref error } => {
                tracing::warn!(event = action.event_type(), %error, "Saving todos failed");
                state.last_error = Some(error.clone());
                SmallVec::new()
            },
        }
    }
}
