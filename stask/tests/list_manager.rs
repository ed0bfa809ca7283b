//! End-to-end tests driving the todo list through the Store
//!
//! Covers persistence on every mutation, reload from storage, storage
//! failures surfacing in state, and the shell front end.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

use proptest::prelude::*;
use stask::{
    load_state, shell, TodoAction, TodoEnvironment, TodoId, TodoItem, TodoReducer, TodoState,
    TodoStore, TODOS_KEY,
};
use stask_core::reducer::Reducer;
use stask_core::storage::StorageError;
use stask_runtime::FileStore;
use stask_testing::{FailingStore, InMemoryStore, SequentialIds};
use std::collections::HashSet;
use std::sync::Arc;

// ============================================================================
// Test Fixtures
// ============================================================================

fn store_with(storage: &InMemoryStore, state: TodoState) -> TodoStore {
    let env = TodoEnvironment::new(Arc::new(SequentialIds::new()), Arc::new(storage.clone()));
    TodoStore::new(state, TodoReducer::new(), env)
}

fn stored_todos(storage: &InMemoryStore) -> Vec<TodoItem> {
    let raw = storage.value(TODOS_KEY).expect("todos were never written");
    serde_json::from_str(&raw).unwrap()
}

async fn add(store: &TodoStore, text: &str) -> TodoId {
    store
        .send(TodoAction::AddTodo {
            text: text.to_string(),
        })
        .await
        .unwrap();
    store
        .state(|s| s.todos.last().map(|t| t.id.clone()))
        .await
        .unwrap()
}

async fn visible_texts(store: &TodoStore) -> Vec<String> {
    store
        .state(|s| s.visible().map(|t| t.text.clone()).collect())
        .await
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn add_toggle_filter_delete_scenario() {
    let storage = InMemoryStore::new();
    let store = store_with(&storage, TodoState::new());

    let a = add(&store, "A").await;
    add(&store, "B").await;
    store
        .send(TodoAction::ToggleComplete { id: a.clone() })
        .await
        .unwrap();
    store
        .send(TodoAction::SetShowCompleted { show: false })
        .await
        .unwrap();

    assert_eq!(visible_texts(&store).await, vec!["B"]);

    store
        .send(TodoAction::RequestDelete { id: a.clone() })
        .await
        .unwrap();
    assert_eq!(store.state(TodoState::count).await, 2);
    store.send(TodoAction::RequestDelete { id: a }).await.unwrap();

    let texts: Vec<String> = store
        .state(|s| s.todos.iter().map(|t| t.text.clone()).collect())
        .await;
    assert_eq!(texts, vec!["B"]);
    assert_eq!(stored_todos(&storage), store.state(|s| s.todos.clone()).await);
}

#[tokio::test]
async fn every_mutation_writes_the_full_list() {
    let storage = InMemoryStore::new();
    let store = store_with(&storage, TodoState::new());

    let a = add(&store, "A").await;
    assert_eq!(storage.write_count(), 1);

    store
        .send(TodoAction::InputChanged {
            text: "typing".to_string(),
        })
        .await
        .unwrap();
    store
        .send(TodoAction::SetShowCompleted { show: false })
        .await
        .unwrap();
    store
        .send(TodoAction::RequestDelete { id: a.clone() })
        .await
        .unwrap();
    store.send(TodoAction::CancelDelete).await.unwrap();
    assert_eq!(storage.write_count(), 1, "UI-only actions must not write");

    store
        .send(TodoAction::BeginEdit { id: a.clone() })
        .await
        .unwrap();
    assert_eq!(storage.write_count(), 2, "entering edit mode saves too");

    store
        .send(TodoAction::EditChanged {
            text: "A2".to_string(),
        })
        .await
        .unwrap();
    store
        .send(TodoAction::CommitEdit { id: a.clone() })
        .await
        .unwrap();
    store
        .send(TodoAction::ToggleComplete { id: a })
        .await
        .unwrap();
    assert_eq!(storage.write_count(), 4);

    assert!(storage.writes().iter().all(|(key, _)| key == TODOS_KEY));
    assert_eq!(
        stored_todos(&storage),
        vec![TodoItem {
            id: TodoId::new("id-1"),
            text: "A2".to_string(),
            completed: true,
        }]
    );
}

#[tokio::test]
async fn reload_reconstructs_identical_list() {
    let storage = InMemoryStore::new();
    let store = store_with(&storage, TodoState::new());

    let first = add(&store, "first").await;
    add(&store, "second").await;
    add(&store, "third").await;
    store
        .send(TodoAction::ToggleComplete { id: first })
        .await
        .unwrap();
    let before = store.state(|s| s.todos.clone()).await;

    let reloaded = load_state(&storage).await.unwrap();

    assert_eq!(reloaded.todos, before);
    assert_eq!(reloaded.editing, None);
    assert_eq!(reloaded.pending_delete, None);
}

#[tokio::test]
async fn storage_failure_surfaces_without_losing_memory_state() {
    let env = TodoEnvironment::new(
        Arc::new(SequentialIds::new()),
        Arc::new(FailingStore::new(StorageError::Io("disk full".to_string()))),
    );
    let store = TodoStore::new(TodoState::new(), TodoReducer::new(), env);

    store
        .send(TodoAction::AddTodo {
            text: "kept".to_string(),
        })
        .await
        .unwrap();

    let (count, error) = store
        .state(|s| (s.count(), s.last_error.clone()))
        .await;
    assert_eq!(count, 1);
    assert_eq!(error.as_deref(), Some("I/O error: disk full"));
}

#[tokio::test]
async fn file_store_persists_across_sessions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stask.json");

    {
        let storage = Arc::new(FileStore::new(&path));
        let env = TodoEnvironment::new(Arc::new(SequentialIds::new()), storage);
        let store = TodoStore::new(TodoState::new(), TodoReducer::new(), env);
        store
            .send(TodoAction::AddTodo {
                text: "survives restart".to_string(),
            })
            .await
            .unwrap();
    }

    let state = load_state(&FileStore::new(&path)).await.unwrap();

    assert_eq!(state.count(), 1);
    assert_eq!(state.todos[0].text, "survives restart");
    assert!(!state.todos[0].completed);
}

#[tokio::test]
async fn shell_session_round_trip() {
    let storage = InMemoryStore::new();
    let store = store_with(&storage, TodoState::new());
    let input: &[u8] =
        b"add Buy milk\nadd Walk dog\ndone 1\nhide\nrm 1\nrm 1\nbogus\nquit\nadd never\n";
    let mut output = Vec::new();

    shell::run(&store, input, &mut output).await.unwrap();

    let texts: Vec<String> = store
        .state(|s| s.todos.iter().map(|t| t.text.clone()).collect())
        .await;
    assert_eq!(texts, vec!["Buy milk"]);
    assert!(store.state(|s| s.todos[0].completed).await);

    let screen = String::from_utf8(output).unwrap();
    assert!(screen.contains("No todos..."));
    assert!(screen.contains("delete? `rm 1` to confirm"));
    assert!(screen.contains("unknown command `bogus`"));
    assert_eq!(stored_todos(&storage).len(), 1);
}

#[tokio::test]
async fn shell_skips_lines_that_are_not_utf8() {
    let storage = InMemoryStore::new();
    let store = store_with(&storage, TodoState::new());
    let input: &[u8] = b"add A\n\xff\xfe\nadd B\n";
    let mut output = Vec::new();

    shell::run(&store, input, &mut output).await.unwrap();

    assert_eq!(visible_texts(&store).await, vec!["A", "B"]);
    let screen = String::from_utf8(output).unwrap();
    assert!(screen.contains("input is not valid UTF-8"));
}

// ============================================================================
// Properties
// ============================================================================

#[derive(Debug, Clone)]
enum Op {
    Add(String),
    Toggle(usize),
    Delete(usize),
    CancelDelete,
    Edit(usize, String),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z ]{0,8}".prop_map(Op::Add),
        (0usize..8).prop_map(Op::Toggle),
        (0usize..8).prop_map(Op::Delete),
        Just(Op::CancelDelete),
        ((0usize..8), "[a-z]{0,5}").prop_map(|(i, t)| Op::Edit(i, t)),
    ]
}

fn id_at(state: &TodoState, index: usize) -> TodoId {
    state
        .todos
        .get(index)
        .map_or_else(|| TodoId::new("missing"), |t| t.id.clone())
}

proptest! {
    #[test]
    fn ids_stay_unique_and_order_is_stable(ops in proptest::collection::vec(op(), 0..40)) {
        let env = TodoEnvironment::new(
            Arc::new(SequentialIds::new()),
            Arc::new(InMemoryStore::new()),
        );
        let reducer = TodoReducer::new();
        let mut state = TodoState::new();
        let mut added = Vec::new();

        for op in ops {
            let actions = match op {
                Op::Add(text) => vec![TodoAction::AddTodo { text }],
                Op::Toggle(i) => vec![TodoAction::ToggleComplete { id: id_at(&state, i) }],
                Op::Delete(i) => vec![TodoAction::RequestDelete { id: id_at(&state, i) }],
                Op::CancelDelete => vec![TodoAction::CancelDelete],
                Op::Edit(i, text) => {
                    let id = id_at(&state, i);
                    vec![
                        TodoAction::BeginEdit { id: id.clone() },
                        TodoAction::EditChanged { text },
                        TodoAction::CommitEdit { id },
                    ]
                },
            };
            for action in actions {
                let _ = reducer.reduce(&mut state, action, &env);
            }
            for todo in &state.todos {
                if !added.contains(&todo.id) {
                    added.push(todo.id.clone());
                }
            }
        }

        let ids: Vec<&TodoId> = state.todos.iter().map(|t| &t.id).collect();
        let unique: HashSet<&TodoId> = ids.iter().copied().collect();
        prop_assert_eq!(unique.len(), ids.len());

        // Survivors appear in the order they were first added
        let positions: Vec<usize> = ids
            .iter()
            .map(|id| added.iter().position(|a| a == *id).unwrap())
            .collect();
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
