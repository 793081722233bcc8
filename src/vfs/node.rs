//! File and directory nodes.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::path;

/// Node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Directory,
}

/// A file or directory in the store.
///
/// # Invariants
/// - `path` is normalized and equals `join(parent, name)`
/// - Only files carry `content`, only directories carry `children`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    path: String,
    name: String,
    kind: NodeKind,
    /// Shared so that snapshots stay cheap after copy-on-write.
    content: Option<Arc<str>>,
    children: BTreeSet<String>,
}

impl FileNode {
    pub(super) fn file(path: String, content: &str) -> Self {
        Self {
            name: path::file_name(&path).to_string(),
            path,
            kind: NodeKind::File,
            content: Some(Arc::from(content)),
            children: BTreeSet::new(),
        }
    }

    pub(super) fn directory(path: String) -> Self {
        Self {
            name: path::file_name(&path).to_string(),
            path,
            kind: NodeKind::Directory,
            content: None,
            children: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    #[inline]
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// File content (`None` for directories).
    #[inline]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Shared handle to the file content.
    #[inline]
    pub fn shared_content(&self) -> Option<Arc<str>> {
        self.content.clone()
    }

    /// Child paths (empty for files).
    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(String::as_str)
    }

    #[inline]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(super) fn set_content(&mut self, content: &str) {
        self.content = Some(Arc::from(content));
    }

    pub(super) fn add_child(&mut self, child: String) {
        self.children.insert(child);
    }

    pub(super) fn remove_child(&mut self, child: &str) {
        self.children.remove(child);
    }

    /// Copy of this node moved to `new_path`, with children rebased from
    /// `old_root` to `new_root`.
    pub(super) fn relocated(&self, new_path: String, old_root: &str, new_root: &str) -> Self {
        let children = self
            .children
            .iter()
            .map(|child| rebase(child, old_root, new_root))
            .collect();
        Self {
            name: path::file_name(&new_path).to_string(),
            path: new_path,
            kind: self.kind,
            content: self.content.clone(),
            children,
        }
    }
}

/// Rewrite `path` (inside `old_root`) to live under `new_root`.
pub(super) fn rebase(path: &str, old_root: &str, new_root: &str) -> String {
    format!("{new_root}{}", &path[old_root.len()..])
}
