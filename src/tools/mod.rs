//! Tool-call protocol.
//!
//! The editing agent drives the store through two tools. Calls arrive as
//! JSON tagged by `tool` and `command`:
//!
//! ```json
//! {"tool":"str_replace_editor","command":"create","path":"/App.jsx","file_text":"..."}
//! {"tool":"file_manager","command":"rename","path":"/a.jsx","new_path":"/b.jsx"}
//! ```
//!
//! Every call maps onto one `FileStore` operation and yields a
//! `ToolResult`; failures are results, never errors.

mod view;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::vfs::{FileStore, FsError};

/// A single tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolCall {
    StrReplaceEditor(EditorCommand),
    FileManager(ManagerCommand),
}

/// `str_replace_editor` commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum EditorCommand {
    View {
        path: String,
        /// 1-based inclusive `[start, end]`; `end = -1` reads to the end.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view_range: Option<[i64; 2]>,
    },
    Create {
        path: String,
        #[serde(default)]
        file_text: String,
    },
    StrReplace {
        path: String,
        old_str: String,
        #[serde(default)]
        new_str: String,
    },
    Insert {
        path: String,
        /// Insert after this line (`0` = top of file).
        insert_line: usize,
        new_str: String,
    },
    UndoEdit {
        path: String,
    },
}

/// `file_manager` commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ManagerCommand {
    Rename { path: String, new_path: String },
    Delete { path: String },
}

/// Outcome reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub message: String,
}

impl ToolResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<FsError> for ToolResult {
    fn from(err: FsError) -> Self {
        Self::fail(format!("Error: {err}"))
    }
}

impl ToolCall {
    /// Whether the call can change the store.
    pub fn mutates(&self) -> bool {
        !matches!(
            self,
            Self::StrReplaceEditor(EditorCommand::View { .. } | EditorCommand::UndoEdit { .. })
        )
    }

    /// Parse one call, or an array of calls.
    pub fn parse_many(json: &str) -> serde_json::Result<Vec<Self>> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum OneOrMany {
            Many(Vec<ToolCall>),
            One(ToolCall),
        }

        Ok(match serde_json::from_str(json)? {
            OneOrMany::Many(calls) => calls,
            OneOrMany::One(call) => vec![call],
        })
    }
}

/// Execute `call` against `store`.
pub fn apply(store: &mut FileStore, call: &ToolCall) -> ToolResult {
    let result = match call {
        ToolCall::StrReplaceEditor(command) => editor(store, command),
        ToolCall::FileManager(command) => manager(store, command),
    };
    let result = result.unwrap_or_else(ToolResult::from);
    crate::debug!("tools"; "{:?} -> {}", call, if result.success { "ok" } else { "failed" });
    result
}

/// Execute calls in order. A failed call does not stop later ones.
pub fn apply_all(store: &mut FileStore, calls: &[ToolCall]) -> Vec<ToolResult> {
    calls.iter().map(|call| apply(store, call)).collect()
}

fn editor(store: &mut FileStore, command: &EditorCommand) -> Result<ToolResult, FsError> {
    Ok(match command {
        EditorCommand::View { path, view_range } => view::render(store.read(path)?, store, *view_range),
        EditorCommand::Create { path, file_text } => {
            let path = store.create_file(path, file_text)?;
            ToolResult::ok(format!("File created: {path}"))
        }
        EditorCommand::StrReplace { path, old_str, new_str } => {
            let count = store.str_replace(path, old_str, new_str)?;
            let noun = if count == 1 { "occurrence" } else { "occurrences" };
            ToolResult::ok(format!("Replaced {count} {noun} in {}", store.read(path)?.path()))
        }
        EditorCommand::Insert {
            path,
            insert_line,
            new_str,
        } => {
            store.insert(path, *insert_line, new_str)?;
            ToolResult::ok(format!("Inserted text after line {insert_line} of {}", store.read(path)?.path()))
        }
        EditorCommand::UndoEdit { .. } => ToolResult::fail("undo_edit is not supported; use str_replace to revert changes"),
    })
}

fn manager(store: &mut FileStore, command: &ManagerCommand) -> Result<ToolResult, FsError> {
    Ok(match command {
        ManagerCommand::Rename { path, new_path } => {
            let from = store.read(path)?.path().to_string();
            let to = store.rename(&from, new_path)?;
            ToolResult::ok(format!("Renamed {from} to {to}"))
        }
        ManagerCommand::Delete { path } => {
            let path = store.read(path)?.path().to_string();
            store.remove(&path)?;
            ToolResult::ok(format!("Deleted {path}"))
        }
    })
}
