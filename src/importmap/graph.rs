//! The reachable module set produced by one traversal.

use std::collections::BTreeSet;
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::RenderGeneration;
use crate::transform::TransformedModule;

type PathSet = FxHashSet<String>;
type PathSetMap = FxHashMap<String, PathSet>;

// =============================================================================
// Dependency graph
// =============================================================================

/// Bidirectional local dependency graph.
///
/// # Invariants
/// - Forward and reverse mappings are always consistent
/// - Self-references are excluded
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Forward: module → modules it imports
    forward: PathSetMap,
    /// Reverse: module → modules importing it
    reverse: PathSetMap,
}

impl DependencyGraph {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the local imports of `module`, replacing earlier ones.
    pub fn record(&mut self, module: &str, imports: &[String]) {
        self.remove_module(module);

        let deps: PathSet = imports.iter().filter(|p| *p != module).cloned().collect();
        for dep in &deps {
            self.reverse
                .entry(dep.clone())
                .or_default()
                .insert(module.to_string());
        }
        self.forward.insert(module.to_string(), deps);
    }

    /// Modules importing `path`, sorted.
    pub fn dependents(&self, path: &str) -> Vec<&str> {
        sorted(self.reverse.get(path))
    }

    /// Modules `path` imports, sorted.
    pub fn dependencies(&self, path: &str) -> Vec<&str> {
        sorted(self.forward.get(path))
    }

    fn remove_module(&mut self, module: &str) {
        let Some(old_deps) = self.forward.remove(module) else {
            return;
        };
        for dep in old_deps {
            if let Some(dependents) = self.reverse.get_mut(&dep) {
                dependents.remove(module);
                if dependents.is_empty() {
                    self.reverse.remove(&dep);
                }
            }
        }
    }
}

fn sorted(set: Option<&PathSet>) -> Vec<&str> {
    let mut out: Vec<&str> = set.into_iter().flatten().map(String::as_str).collect();
    out.sort_unstable();
    out
}

// =============================================================================
// Module graph
// =============================================================================

/// One reachable local module and the import-map keys bound to it.
#[derive(Debug, Clone)]
pub struct GraphModule {
    pub path: String,
    pub module: Arc<TransformedModule>,
    pub keys: Vec<String>,
}

/// A stylesheet collected from reachable modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stylesheet {
    /// Project CSS file, injected as `<style>`.
    Inline { path: String, css: String },
    /// Package CSS, injected as `<link>`.
    External { url: String },
}

/// Result of a traversal: everything `bind` needs, nothing issued yet.
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    pub(super) entry: String,
    pub(super) generation: RenderGeneration,
    pub(super) modules: Vec<GraphModule>,
    pub(super) externals: BTreeSet<String>,
    pub(super) placeholders: BTreeSet<String>,
    pub(super) stylesheets: Vec<Stylesheet>,
    pub(super) warnings: Vec<String>,
    pub(super) deps: DependencyGraph,
}

impl ModuleGraph {
    pub(super) fn new(entry: &str, generation: RenderGeneration) -> Self {
        Self {
            entry: entry.to_string(),
            generation,
            modules: Vec::new(),
            externals: BTreeSet::new(),
            placeholders: BTreeSet::new(),
            stylesheets: Vec::new(),
            warnings: Vec::new(),
            deps: DependencyGraph::new(),
        }
    }

    #[inline]
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Snapshot generation the traversal ran against.
    #[inline]
    pub fn generation(&self) -> RenderGeneration {
        self.generation
    }

    /// Local modules in discovery order, entry first.
    #[inline]
    pub fn modules(&self) -> &[GraphModule] {
        &self.modules
    }

    pub fn module(&self, path: &str) -> Option<&GraphModule> {
        self.modules.iter().find(|m| m.path == path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.module(path).is_some()
    }

    /// Bare specifiers mapped to the CDN.
    pub fn externals(&self) -> impl Iterator<Item = &str> {
        self.externals.iter().map(String::as_str)
    }

    /// Local-looking specifiers that matched no file.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.placeholders.iter().map(String::as_str)
    }

    #[inline]
    pub fn stylesheets(&self) -> &[Stylesheet] {
        &self.stylesheets
    }

    #[inline]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Local modules importing `path`.
    pub fn dependents(&self, path: &str) -> Vec<&str> {
        self.deps.dependents(path)
    }

    /// Local modules `path` imports.
    pub fn dependencies(&self, path: &str) -> Vec<&str> {
        self.deps.dependencies(path)
    }

    pub(super) fn warn(&mut self, message: String) {
        crate::debug!("importmap"; "{}", message);
        self.warnings.push(message);
    }
}
