//! `view` output: numbered lines for files, a listing for directories.

use super::ToolResult;
use crate::vfs::{FileNode, FileStore};

pub(super) fn render(node: &FileNode, store: &FileStore, range: Option<[i64; 2]>) -> ToolResult {
    match node.content() {
        Some(content) => file(content, range),
        None => ToolResult::ok(directory(node, store)),
    }
}

fn file(content: &str, range: Option<[i64; 2]>) -> ToolResult {
    if content.is_empty() {
        return ToolResult::ok("(empty file)");
    }
    let lines: Vec<&str> = content.lines().collect();
    let len = lines.len() as i64;

    let (start, end) = match range {
        None => (1, len),
        Some([start, end]) => {
            let end = if end == -1 { len } else { end.min(len) };
            if start < 1 || start > len || end < start {
                return ToolResult::fail(format!("Error: invalid view_range [{start}, {end}] for a file of {len} lines"));
            }
            (start, end)
        }
    };

    let width = end.to_string().len();
    let text = lines[(start - 1) as usize..end as usize]
        .iter()
        .zip(start..)
        .map(|(line, n)| format!("{n:>width$}\t{line}"))
        .collect::<Vec<_>>()
        .join("\n");
    ToolResult::ok(text)
}

fn directory(node: &FileNode, store: &FileStore) -> String {
    if node.child_count() == 0 {
        return "(empty directory)".to_string();
    }
    node.children()
        .filter_map(|child| store.read(child).ok())
        .map(|child| {
            let tag = if child.is_dir() { "[DIR]" } else { "[FILE]" };
            format!("{tag} {}", child.name())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
