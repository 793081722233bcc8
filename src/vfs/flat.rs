//! Flat `path -> content` serialization boundary.
//!
//! Files map to their content. Directories that would otherwise be lost
//! (empty ones) map to `null`, so a round-trip preserves every kind.
//!
//! ```json
//! { "/App.jsx": "export default ...", "/assets": null }
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{FileStore, FsError, NodeKind, StoreChange, path};

/// Flat project representation handed to the persistence collaborator.
pub type FlatProject = BTreeMap<String, Option<String>>;

impl FileStore {
    /// Build a store from a flat mapping.
    pub fn from_flat(flat: &FlatProject) -> Result<Self, FsError> {
        let mut store = Self::new();
        store.import_flat(flat)?;
        Ok(store)
    }

    /// Export every file and every empty directory.
    pub fn export_flat(&self) -> FlatProject {
        self.nodes
            .values()
            .filter(|node| node.path() != path::ROOT)
            .filter_map(|node| match node.kind() {
                NodeKind::File => Some((node.path().to_string(), node.content().map(str::to_string))),
                NodeKind::Directory if node.child_count() == 0 => Some((node.path().to_string(), None)),
                NodeKind::Directory => None,
            })
            .collect()
    }

    /// Replace the whole tree. On error the store is left untouched.
    pub fn import_flat(&mut self, flat: &FlatProject) -> Result<(), FsError> {
        let mut staged = FileStore::new();
        for (raw, content) in flat {
            match content {
                Some(text) => staged.create_file(raw, text)?,
                None => staged.create_dir(raw)?,
            };
        }

        self.nodes = Arc::clone(&staged.nodes);
        self.changed(StoreChange::Replaced);
        Ok(())
    }
}

/// Parse a flat project from JSON.
pub fn flat_from_json(json: &str) -> serde_json::Result<FlatProject> {
    serde_json::from_str(json)
}

/// Serialize a flat project as pretty JSON.
pub fn flat_to_json(flat: &FlatProject) -> serde_json::Result<String> {
    serde_json::to_string_pretty(flat)
}
