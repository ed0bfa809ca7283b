//! Plain-text rendering of the list.
//!
//! Rows are numbered from 1 over the *visible* todos; [`row_id`] maps a row
//! number back to the todo's id so commands always address items by id.

use crate::types::{TodoId, TodoState};
use std::fmt::Write;

/// Heading printed above the list
pub const TITLE: &str = "Stask - Manage your todos";

/// Shown when the list has no todos at all
pub const EMPTY_MESSAGE: &str = "No todos...";

/// Id of the todo shown on 1-based `row`, if any
#[must_use]
pub fn row_id(state: &TodoState, row: usize) -> Option<TodoId> {
    row.checked_sub(1)
        .and_then(|index| state.visible().nth(index))
        .map(|todo| todo.id.clone())
}

/// Render the whole screen
#[must_use]
pub fn render(state: &TodoState) -> String {
    let mut out = String::new();
    let check = |on: bool| if on { "[x]" } else { "[ ]" };

    let _ = writeln!(out, "{TITLE}");
    let _ = writeln!(out, "{} Show Finished", check(state.show_completed));
    let _ = writeln!(out, "Your todos");

    if state.is_empty() {
        let _ = writeln!(out, "  {EMPTY_MESSAGE}");
    }

    for (index, todo) in state.visible().enumerate() {
        let row = index + 1;
        let _ = write!(out, "{row:>3}. {} ", check(todo.completed));

        match &state.editing {
            Some(session) if session.id == todo.id => {
                let _ = write!(out, "> {}  (editing: `save` to keep)", session.buffer);
            },
            _ if todo.completed => {
                let _ = write!(out, "~~{}~~", todo.text);
            },
            _ => {
                let _ = write!(out, "{}", todo.text);
            },
        }

        if state.is_pending_delete(&todo.id) {
            let _ = write!(out, "  (delete? `rm {row}` to confirm, `cancel` to keep)");
        }
        out.push('\n');
    }

    if let Some(error) = &state.last_error {
        let _ = writeln!(out, "! Could not save todos: {error}");
    }

    out
}
