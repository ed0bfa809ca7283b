//! Line-oriented terminal front end.
//!
//! Each input line is parsed into a [`Command`], translated into
//! [`TodoAction`]s against the current state, sent to the store, and the
//! list is re-rendered.

use crate::types::TodoAction;
use crate::view::{render, row_id};
use crate::TodoStore;
use stask_runtime::StoreError;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Text printed by `help`
pub const HELP: &str = "\
Commands:
  add <text>     add a todo
  edit <n>       start editing row n
  type <text>    replace the text being edited
  save           save the edit
  cancel-edit    discard the edit
  done <n>       toggle row n finished/unfinished
  rm <n>         delete row n (repeat to confirm)
  cancel         cancel the pending delete
  show | hide    show or hide finished todos
  list           print the list
  help           print this help
  quit           exit
";

/// A parsed shell command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a todo with this text
    Add(String),
    /// Start editing a row
    Edit(usize),
    /// Replace the edit buffer
    Type(String),
    /// Commit the current edit
    Save,
    /// Abandon the current edit
    CancelEdit,
    /// Toggle a row's completed flag
    Toggle(usize),
    /// Request deletion of a row
    Remove(usize),
    /// Disarm the pending deletion
    CancelDelete,
    /// Show finished todos
    Show,
    /// Hide finished todos
    Hide,
    /// Print the list
    List,
    /// Print help
    Help,
    /// Leave the shell
    Quit,
}

/// Problems with a single input line, reported back to the user
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unrecognised command word
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),

    /// Command needs a row number
    #[error("`{0}` needs a row number")]
    MissingRow(&'static str),

    /// Row argument is not a number
    #[error("`{0}` is not a row number")]
    InvalidRow(String),

    /// Row number does not match a visible todo
    #[error("there is no row {0}")]
    NoSuchRow(usize),

    /// `save` without an edit in progress
    #[error("nothing is being edited")]
    NotEditing,

    /// Input line is not UTF-8
    #[error("input is not valid UTF-8")]
    NotUtf8,
}

/// Errors that end the shell
#[derive(Error, Debug)]
pub enum ShellError {
    /// Terminal I/O failed
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The store rejected an action
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parse one input line
///
/// Returns `Ok(None)` for blank lines.
///
/// # Errors
///
/// Returns [`CommandError`] if the line is not a valid command.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let trimmed = line.trim_start();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (trimmed, ""),
    };

    let row = |name: &'static str| -> Result<usize, CommandError> {
        let arg = rest.trim();
        if arg.is_empty() {
            return Err(CommandError::MissingRow(name));
        }
        arg.parse().map_err(|_| CommandError::InvalidRow(arg.to_string()))
    };

    let command = match word {
        "add" => Command::Add(rest.to_string()),
        "edit" => Command::Edit(row("edit")?),
        "type" => Command::Type(rest.to_string()),
        "save" => Command::Save,
        "cancel-edit" => Command::CancelEdit,
        "done" => Command::Toggle(row("done")?),
        "rm" => Command::Remove(row("rm")?),
        "cancel" => Command::CancelDelete,
        "show" => Command::Show,
        "hide" => Command::Hide,
        "list" | "ls" => Command::List,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}

/// Translate a command into the actions it dispatches
///
/// Row numbers are resolved against the visible rows of `state`.
///
/// # Errors
///
/// Returns [`CommandError`] if a row does not exist or `save` is used
/// outside an edit.
pub fn actions_for(
    command: Command,
    state: &crate::TodoState,
) -> Result<Vec<TodoAction>, CommandError> {
    let id_at = |row: usize| row_id(state, row).ok_or(CommandError::NoSuchRow(row));

    let actions = match command {
        Command::Add(text) => vec![
            TodoAction::InputChanged { text: text.clone() },
            TodoAction::AddTodo { text },
        ],
        Command::Edit(row) => vec![TodoAction::BeginEdit { id: id_at(row)? }],
        Command::Type(text) => vec![TodoAction::EditChanged { text }],
        Command::Save => {
            let session = state.editing.as_ref().ok_or(CommandError::NotEditing)?;
            vec![TodoAction::CommitEdit {
                id: session.id.clone(),
            }]
        },
        Command::CancelEdit => vec![TodoAction::CancelEdit],
        Command::Toggle(row) => vec![TodoAction::ToggleComplete { id: id_at(row)? }],
        Command::Remove(row) => vec![TodoAction::RequestDelete { id: id_at(row)? }],
        Command::CancelDelete => vec![TodoAction::CancelDelete],
        Command::Show => vec![TodoAction::SetShowCompleted { show: true }],
        Command::Hide => vec![TodoAction::SetShowCompleted { show: false }],
        Command::List | Command::Help | Command::Quit => Vec::new(),
    };

    Ok(actions)
}

/// Run the shell until `quit` or end of input
///
/// # Errors
///
/// Returns [`ShellError`] if reading input or writing output fails, or if
/// the store rejects an action.
pub async fn run<R, W>(store: &TodoStore, mut input: R, mut output: W) -> Result<(), ShellError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();

    let screen = store.state(render).await;
    output.write_all(screen.as_bytes()).await?;
    output.write_all(b"> ").await?;
    output.flush().await?;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let parsed = std::str::from_utf8(&buf)
            .map_err(|_| CommandError::NotUtf8)
            .and_then(parse);
        let command = match parsed {
            Ok(Some(command)) => command,
            Ok(None) => {
                output.write_all(b"> ").await?;
                output.flush().await?;
                continue;
            },
            Err(error) => {
                output.write_all(format!("{error}\n> ").as_bytes()).await?;
                output.flush().await?;
                continue;
            },
        };

        match command {
            Command::Quit => break,
            Command::Help => output.write_all(HELP.as_bytes()).await?,
            command => {
                let resolved = store.state(|state| actions_for(command, state)).await;
                match resolved {
                    Ok(actions) => {
                        for action in actions {
                            tracing::debug!(action = action.name(), "Dispatching");
                            store.send(action).await?;
                        }
                        let screen = store.state(render).await;
                        output.write_all(screen.as_bytes()).await?;
                    },
                    Err(error) => {
                        output.write_all(format!("{error}\n").as_bytes()).await?;
                    },
                }
            },
        }

        output.write_all(b"> ").await?;
        output.flush().await?;
    }

    output.flush().await?;
    Ok(())
}
