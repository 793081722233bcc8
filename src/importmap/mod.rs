//! Import map synthesis.
//!
//! Two phases so nothing is issued for work that may be thrown away:
//!
//! 1. `traverse` walks the reachable files from the entry against one
//!    snapshot, transforming each (through the shared cache) and classifying
//!    every specifier. Pure: no blob handles, no shared state besides the
//!    cache.
//! 2. `bind` issues one blob per reachable module and produces the
//!    specifier → URL table.
//!
//! Every local module is bound under each equivalent written form (alias,
//! absolute and bare root-relative, each with and without extension, plus
//! the directory form for `index` files) as long as that form actually
//! resolves to it.

mod cdn;
mod graph;


pub use cdn::{CdnPolicy, DEFAULT_CDN, RUNTIME_SPECIFIERS, is_url};
pub use graph::{DependencyGraph, GraphModule, ModuleGraph, Stylesheet};

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::preview::{BlobHost, BlobId};
use crate::resolve::{PackageSpecifier, PathResolver, Resolution, ResolverOptions, SpecifierKind, canonical};
use crate::transform::{ModuleCache, ModuleTransformer, SyntaxDiagnostic};
use crate::vfs::{StoreSnapshot, path};

// =============================================================================
// ImportMap
// =============================================================================

/// Browser import map: `{"imports": {specifier: url}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportMap {
    imports: BTreeMap<String, String>,
}

impl ImportMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, specifier: impl Into<String>, url: impl Into<String>) {
        self.imports.insert(specifier.into(), url.into());
    }

    pub fn get(&self, specifier: &str) -> Option<&str> {
        self.imports.get(specifier).map(String::as_str)
    }

    pub fn contains(&self, specifier: &str) -> bool {
        self.imports.contains_key(specifier)
    }

    pub fn len(&self) -> usize {
        self.imports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.imports.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Serialize as the standard import map JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| r#"{"imports":{}}"#.to_string())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Why a traversal produced no graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("entry file `{0}` does not exist")]
    MissingEntry(String),

    #[error("{0}")]
    Syntax(SyntaxDiagnostic),

    /// The caller asked to stop between two steps.
    #[error("traversal interrupted")]
    Interrupted,
}

// =============================================================================
// Builder
// =============================================================================

/// Output of `bind`: the map plus the blob handles it holds.
#[derive(Debug, Clone)]
pub struct BoundMap {
    pub import_map: ImportMap,
    /// One entry per `issue`; release each exactly once.
    pub leases: Vec<BlobId>,
    /// Specifier that loads the entry module.
    pub entry_specifier: String,
}

/// Resolves, transforms and binds one project's module graph.
#[derive(Debug, Clone)]
pub struct ImportMapBuilder {
    resolver: ResolverOptions,
    transformer: ModuleTransformer,
    cache: Arc<ModuleCache>,
    cdn: CdnPolicy,
}

impl Default for ImportMapBuilder {
    fn default() -> Self {
        Self::new(ResolverOptions::default(), CdnPolicy::default())
    }
}

impl ImportMapBuilder {
    pub fn new(resolver: ResolverOptions, cdn: CdnPolicy) -> Self {
        Self {
            transformer: ModuleTransformer::new(resolver.alias.clone()),
            resolver,
            cache: Arc::new(ModuleCache::new()),
            cdn,
        }
    }

    /// Share a module cache with other builders.
    pub fn with_cache(mut self, cache: Arc<ModuleCache>) -> Self {
        self.cache = cache;
        self
    }

    #[inline]
    pub fn cache(&self) -> &Arc<ModuleCache> {
        &self.cache
    }

    #[inline]
    pub fn cdn(&self) -> &CdnPolicy {
        &self.cdn
    }

    #[inline]
    pub fn resolver_options(&self) -> &ResolverOptions {
        &self.resolver
    }

    /// Traverse without interruption.
    pub fn build(&self, entry: &str, snapshot: &StoreSnapshot) -> Result<ModuleGraph, BuildError> {
        self.traverse(entry, snapshot, || true)
    }

    /// Breadth-first traversal from `entry`.
    ///
    /// `proceed` is consulted before every module; returning `false` stops
    /// with `BuildError::Interrupted`. A module already visited in this
    /// traversal is never transformed or queued again, so import cycles
    /// terminate.
    pub fn traverse(
        &self,
        entry: &str,
        snapshot: &StoreSnapshot,
        mut proceed: impl FnMut() -> bool,
    ) -> Result<ModuleGraph, BuildError> {
        let entry = path::normalize(entry).map_err(|_| BuildError::MissingEntry(entry.to_string()))?;
        if !snapshot.is_file(&entry) {
            return Err(BuildError::MissingEntry(entry));
        }

        let resolver = PathResolver::new(snapshot, &self.resolver);
        let mut graph = ModuleGraph::new(&entry, snapshot.generation());
        let mut visited: FxHashSet<String> = FxHashSet::default();
        let mut queue = VecDeque::from([entry.clone()]);
        visited.insert(entry);

        while let Some(current) = queue.pop_front() {
            if !proceed() {
                return Err(BuildError::Interrupted);
            }

            let source = snapshot
                .get(&current)
                .and_then(|node| node.content())
                .unwrap_or_default();
            let module = self
                .cache
                .get_or_transform(&self.transformer, &current, source)
                .map_err(BuildError::Syntax)?;

            let mut local = Vec::new();
            for specifier in &module.import_specifiers {
                if is_url(specifier) {
                    continue;
                }
                match resolver.resolve(&current, specifier) {
                    Resolution::Local(target) => {
                        if visited.insert(target.clone()) {
                            queue.push_back(target.clone());
                        }
                        local.push(target);
                    }
                    Resolution::Unresolved => self.unresolved(&mut graph, &resolver, &current, specifier),
                }
            }
            for sheet in &module.stylesheets {
                self.stylesheet(&mut graph, &resolver, snapshot, &current, sheet);
            }

            graph.deps.record(&current, &local);
            let keys = local_keys(&resolver, &current);
            graph.modules.push(GraphModule {
                path: current,
                module,
                keys,
            });
        }

        crate::debug!(
            "importmap";
            "{} modules, {} externals, {} placeholders",
            graph.modules.len(),
            graph.externals.len(),
            graph.placeholders.len()
        );
        Ok(graph)
    }

    /// Issue blobs for every module of `graph` and build the map.
    pub fn bind(&self, graph: &ModuleGraph, blobs: &mut dyn BlobHost) -> BoundMap {
        let mut import_map = ImportMap::new();
        let mut leases = Vec::with_capacity(graph.modules.len() + graph.placeholders.len());

        for specifier in RUNTIME_SPECIFIERS {
            if let Some(url) = self.cdn.url_for(specifier) {
                import_map.insert(specifier, url);
            }
        }
        for specifier in graph.externals() {
            if let Some(url) = self.cdn.url_for(specifier) {
                import_map.insert(specifier, url);
            }
        }

        for key in graph.placeholders() {
            let body: Arc<str> = placeholder_module(key).into();
            let id = BlobId::of(&body);
            import_map.insert(key, blobs.issue(id, &body));
            leases.push(id);
        }

        // Local modules last: a project file shadows a package of the same
        // name, except the runtime's own packages and packages some other
        // import already maps to the CDN.
        for module in &graph.modules {
            let id = BlobId::from(module.module.blob_identity);
            let url = blobs.issue(id, &module.module.compiled_body);
            for key in module.keys.iter().filter(|key| !reserved_package(graph, key)) {
                import_map.insert(key.clone(), url.clone());
            }
            leases.push(id);
        }

        let entry_specifier = canonical(&self.resolver.alias, &graph.entry);
        BoundMap {
            import_map,
            leases,
            entry_specifier,
        }
    }

    fn unresolved(&self, graph: &mut ModuleGraph, resolver: &PathResolver<'_>, from: &str, specifier: &str) {
        match resolver.classify(specifier) {
            SpecifierKind::Bare => {
                if self.cdn.url_for(specifier).is_some() {
                    graph.externals.insert(specifier.to_string());
                } else {
                    graph.warn(format!("{from}: `{specifier}` is not a package name"));
                }
            }
            _ => match resolver.canonical_specifier(from, specifier) {
                Some(key) => {
                    graph.warn(format!("{from}: cannot resolve `{specifier}`, rendering nothing"));
                    graph.placeholders.insert(key);
                }
                None => graph.warn(format!("{from}: `{specifier}` points outside the project")),
            },
        }
    }

    fn stylesheet(
        &self,
        graph: &mut ModuleGraph,
        resolver: &PathResolver<'_>,
        snapshot: &StoreSnapshot,
        from: &str,
        specifier: &str,
    ) {
        let plain = specifier.split(['?', '#']).next().unwrap_or(specifier);
        let sheet = match resolver.resolve(from, plain) {
            Resolution::Local(path) => {
                let css = snapshot
                    .get(&path)
                    .and_then(|node| node.content())
                    .unwrap_or_default()
                    .to_string();
                Stylesheet::Inline { path, css }
            }
            Resolution::Unresolved if resolver.classify(plain) == SpecifierKind::Bare => {
                match self.cdn.url_for(plain) {
                    Some(url) => Stylesheet::External { url },
                    None => return graph.warn(format!("{from}: `{specifier}` is not a package name")),
                }
            }
            Resolution::Unresolved => {
                return graph.warn(format!("{from}: stylesheet `{specifier}` not found"));
            }
        };
        if !graph.stylesheets.contains(&sheet) {
            graph.stylesheets.push(sheet);
        }
    }
}

/// Every written form that resolves to `file`, canonical alias form first.
pub fn local_keys(resolver: &PathResolver<'_>, file: &str) -> Vec<String> {
    let alias = resolver.options().alias.as_str();
    let stem = path::strip_extension(file);

    let mut forms = vec![file, stem];
    if path::file_name(stem) == "index"
        && let Some(dir) = path::parent(stem)
        && dir != path::ROOT
    {
        forms.push(dir);
    }

    let mut keys: Vec<String> = Vec::new();
    for form in forms {
        for key in [canonical(alias, form), form.to_string(), form[1..].to_string()] {
            if !keys.contains(&key) && resolver.resolve(path::ROOT, &key).local() == Some(file) {
                keys.push(key);
            }
        }
    }
    keys
}

/// Whether a bare local key names a package the import map must keep.
fn reserved_package(graph: &ModuleGraph, key: &str) -> bool {
    RUNTIME_SPECIFIERS.contains(&key)
        || (PackageSpecifier::parse(key).is_some() && graph.externals.contains(key))
}

/// Module bound to a specifier that matched no file.
fn placeholder_module(specifier: &str) -> String {
    let quoted = serde_json::Value::String(specifier.to_string());
    format!(
        "console.warn(\"[kiln] unresolved import:\", {quoted});\n\
         export default function Missing() {{ return null; }}\n"
    )
}
