//! In-memory project file store.
//!
//! Arena-by-path layout: one flat map keyed by normalized path, plus an
//! explicit child set per directory. There are no parent pointers, so renames
//! and deletes are plain map edits over the affected subtree.
//!
//! The map sits behind an `Arc`: snapshots taken by the render pipeline are
//! O(1) and the next mutation copies on write.
//!
//! # Module Structure
//!
//! - `path` - normalization and path arithmetic
//! - `node` - `FileNode` / `NodeKind`
//! - `event` - change notifications
//! - `edit` - text range edits used by the tool protocol
//! - `flat` - flat `path -> content` import/export

mod edit;
mod event;
mod flat;
mod node;
pub mod path;


pub use event::{StoreChange, StoreEvent};
pub use flat::{FlatProject, flat_from_json, flat_to_json};
pub use node::{FileNode, NodeKind};

use std::sync::Arc;

use crossbeam::channel::Receiver;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::core::{GenerationClock, RenderGeneration};
use event::Notifier;
use node::rebase;
use path::ROOT;

type NodeMap = FxHashMap<String, FileNode>;

// =============================================================================
// Errors
// =============================================================================

/// Structural store errors. Always returned as values, never panics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("no such file or directory: `{0}`")]
    NotFound(String),

    #[error("path already exists: `{0}`")]
    Conflict(String),

    #[error("`{0}` is a directory")]
    IsDirectory(String),

    #[error("`{0}` is not a directory")]
    NotADirectory(String),

    #[error("invalid path `{0}`: {1}")]
    InvalidPath(String, &'static str),

    #[error("text to replace was not found in `{0}`")]
    NoMatch(String),

    #[error("line {line} is out of range for `{path}` ({len} lines)")]
    LineOutOfRange { path: String, line: usize, len: usize },
}

// =============================================================================
// FileStore
// =============================================================================

/// The single source of truth for project contents.
#[derive(Debug)]
pub struct FileStore {
    nodes: Arc<NodeMap>,
    clock: GenerationClock,
    notifier: Notifier,
    revision: u64,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore {
    /// Create an empty store (root directory only).
    pub fn new() -> Self {
        Self::with_clock(GenerationClock::new())
    }

    /// Create an empty store advancing the given clock on every mutation.
    pub fn with_clock(clock: GenerationClock) -> Self {
        let mut nodes = NodeMap::default();
        nodes.insert(ROOT.to_string(), FileNode::directory(ROOT.to_string()));
        Self {
            nodes: Arc::new(nodes),
            clock,
            notifier: Notifier::default(),
            revision: 0,
        }
    }

    /// Generation clock shared with render pipelines.
    #[inline]
    pub fn clock(&self) -> &GenerationClock {
        &self.clock
    }

    /// Generation produced by the latest mutation (or render start).
    #[inline]
    pub fn generation(&self) -> RenderGeneration {
        self.clock.current()
    }

    /// Number of mutations applied so far. Unlike `generation`, render
    /// passes do not move it.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Receive a `StoreEvent` for every future mutation.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        self.notifier.subscribe()
    }

    /// Immutable view of the current tree.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            nodes: Arc::clone(&self.nodes),
            generation: self.clock.current(),
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn read(&self, raw: &str) -> Result<&FileNode, FsError> {
        let path = path::normalize(raw)?;
        match self.nodes.get(&path) {
            Some(node) => Ok(node),
            None => Err(FsError::NotFound(path)),
        }
    }

    pub fn exists(&self, raw: &str) -> bool {
        path::normalize(raw).is_ok_and(|p| self.nodes.contains_key(&p))
    }

    /// Number of nodes, including the root.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the store holds nothing but the root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// All nodes sorted by path (root first).
    pub fn list(&self) -> Vec<&FileNode> {
        let mut all: Vec<_> = self.nodes.values().collect();
        all.sort_unstable_by(|a, b| a.path().cmp(b.path()));
        all
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Create a node, materializing missing ancestor directories.
    ///
    /// Creating an existing directory is a no-op; any other existing path is
    /// a `Conflict`. Returns the normalized path.
    pub fn create(
        &mut self,
        raw: &str,
        kind: NodeKind,
        content: Option<&str>,
    ) -> Result<String, FsError> {
        let path = path::normalize(raw)?;
        if kind == NodeKind::Directory && content.is_some_and(|c| !c.is_empty()) {
            return Err(FsError::IsDirectory(path));
        }
        if let Some(existing) = self.nodes.get(&path) {
            return if existing.is_dir() && kind == NodeKind::Directory {
                Ok(path)
            } else {
                Err(FsError::Conflict(path))
            };
        }

        let missing = self.missing_ancestors(&path)?;
        let nodes = Arc::make_mut(&mut self.nodes);
        materialize(nodes, &missing);
        let node = match kind {
            NodeKind::File => FileNode::file(path.clone(), content.unwrap_or_default()),
            NodeKind::Directory => FileNode::directory(path.clone()),
        };
        attach(nodes, node);

        self.changed(StoreChange::Created(path.clone()));
        Ok(path)
    }

    #[inline]
    pub fn create_file(&mut self, raw: &str, content: &str) -> Result<String, FsError> {
        self.create(raw, NodeKind::File, Some(content))
    }

    #[inline]
    pub fn create_dir(&mut self, raw: &str) -> Result<String, FsError> {
        self.create(raw, NodeKind::Directory, None)
    }

    /// Replace a file's content. Writing identical content is a no-op.
    pub fn write(&mut self, raw: &str, content: &str) -> Result<(), FsError> {
        let path = path::normalize(raw)?;
        let Some(node) = self.nodes.get(&path) else {
            return Err(FsError::NotFound(path));
        };
        if node.is_dir() {
            return Err(FsError::IsDirectory(path));
        }
        if node.content() == Some(content) {
            return Ok(());
        }

        if let Some(node) = Arc::make_mut(&mut self.nodes).get_mut(&path) {
            node.set_content(content);
        }
        self.changed(StoreChange::Updated(path));
        Ok(())
    }

    /// Move a node and its whole subtree. All-or-nothing.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<String, FsError> {
        let from = path::normalize(old)?;
        let to = path::normalize(new)?;

        if from == ROOT || to == ROOT {
            return Err(FsError::InvalidPath(from, "cannot rename the project root"));
        }
        if !self.nodes.contains_key(&from) {
            return Err(FsError::NotFound(from));
        }
        if self.nodes.contains_key(&to) {
            return Err(FsError::Conflict(to));
        }
        if path::is_within(&to, &from) {
            return Err(FsError::InvalidPath(to, "cannot move a directory into itself"));
        }

        // Validate everything before touching the map.
        let missing = self.missing_ancestors(&to)?;
        let subtree = self.subtree(&from);

        let nodes = Arc::make_mut(&mut self.nodes);
        detach(nodes, &from);
        let moved: Vec<FileNode> = subtree
            .iter()
            .filter_map(|p| nodes.remove(p))
            .map(|node| node.relocated(rebase(node.path(), &from, &to), &from, &to))
            .collect();

        materialize(nodes, &missing);
        for node in moved {
            nodes.insert(node.path().to_string(), node);
        }
        if let Some(parent) = path::parent(&to)
            && let Some(dir) = nodes.get_mut(parent)
        {
            dir.add_child(to.clone());
        }

        self.changed(StoreChange::Renamed {
            from,
            to: to.clone(),
        });
        Ok(to)
    }

    /// Remove a node and its whole subtree.
    pub fn remove(&mut self, raw: &str) -> Result<(), FsError> {
        let path = path::normalize(raw)?;
        if path == ROOT {
            return Err(FsError::InvalidPath(path, "cannot remove the project root"));
        }
        if !self.nodes.contains_key(&path) {
            return Err(FsError::NotFound(path));
        }

        let subtree = self.subtree(&path);
        let nodes = Arc::make_mut(&mut self.nodes);
        detach(nodes, &path);
        for p in &subtree {
            nodes.remove(p);
        }

        self.changed(StoreChange::Removed(path));
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Private
    // -------------------------------------------------------------------------

    /// Ancestors of `path` that do not exist yet, outermost first.
    fn missing_ancestors(&self, path: &str) -> Result<Vec<String>, FsError> {
        let mut missing = Vec::new();
        for ancestor in path::ancestors(path) {
            match self.nodes.get(ancestor) {
                Some(node) if node.is_dir() => break,
                Some(_) => return Err(FsError::NotADirectory(ancestor.to_string())),
                None => missing.push(ancestor.to_string()),
            }
        }
        missing.reverse();
        Ok(missing)
    }

    /// `root` and all of its descendants, parents before children.
    fn subtree(&self, root: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut stack = vec![root.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children().map(str::to_string));
            }
            out.push(current);
        }
        out
    }

    fn changed(&mut self, change: StoreChange) {
        let generation = self.clock.advance();
        self.revision += 1;
        crate::debug!("vfs"; "{:?} -> {}", change, generation);
        self.notifier.emit(StoreEvent { generation, change });
    }
}

/// Insert missing directories (outermost first).
fn materialize(nodes: &mut NodeMap, missing: &[String]) {
    for dir in missing {
        attach(nodes, FileNode::directory(dir.clone()));
    }
}

/// Insert a node and register it with its (existing) parent.
fn attach(nodes: &mut NodeMap, node: FileNode) {
    if let Some(parent) = path::parent(node.path())
        && let Some(dir) = nodes.get_mut(parent)
    {
        dir.add_child(node.path().to_string());
    }
    nodes.insert(node.path().to_string(), node);
}

/// Unregister a node from its parent's child set.
fn detach(nodes: &mut NodeMap, path: &str) {
    if let Some(parent) = path::parent(path)
        && let Some(dir) = nodes.get_mut(parent)
    {
        dir.remove_child(path);
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable view of the store taken at one generation.
///
/// Render passes traverse a snapshot, never the live store.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    nodes: Arc<NodeMap>,
    generation: RenderGeneration,
}

impl StoreSnapshot {
    /// Generation of the store when the snapshot was taken.
    #[inline]
    pub fn generation(&self) -> RenderGeneration {
        self.generation
    }

    /// Look up a normalized path.
    #[inline]
    pub fn get(&self, path: &str) -> Option<&FileNode> {
        self.nodes.get(path)
    }

    #[inline]
    pub fn is_file(&self, path: &str) -> bool {
        self.nodes.get(path).is_some_and(FileNode::is_file)
    }

    #[inline]
    pub fn is_dir(&self, path: &str) -> bool {
        self.nodes.get(path).is_some_and(FileNode::is_dir)
    }

    pub fn file_count(&self) -> usize {
        self.nodes.values().filter(|n| n.is_file()).count()
    }
}
