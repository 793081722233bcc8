//! Transform cache keyed by path and validated by content hash.
//!
//! An entry is reused only while its `source_hash` matches the text being
//! compiled; any mismatch recompiles and replaces it. Failed transforms are
//! never cached, so the last good module for a path survives a bad edit.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;

use super::{ModuleTransformer, SyntaxDiagnostic, TransformedModule};
use crate::freshness::hash_str;

/// Counters observable by tests and the dev server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Sources actually parsed.
    pub parses: usize,
    /// Lookups answered without parsing.
    pub hits: usize,
    pub entries: usize,
}

/// Thread-safe module cache shared across render passes.
#[derive(Debug, Default)]
pub struct ModuleCache {
    modules: DashMap<String, Arc<TransformedModule>>,
    parses: AtomicUsize,
    hits: AtomicUsize,
}

impl ModuleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached module for `path` if it was compiled from `source`,
    /// otherwise compile and replace.
    pub fn get_or_transform(
        &self,
        transformer: &ModuleTransformer,
        path: &str,
        source: &str,
    ) -> Result<Arc<TransformedModule>, SyntaxDiagnostic> {
        let hash = hash_str(source);
        let cached = self.modules.get(path).map(|entry| Arc::clone(entry.value()));
        if let Some(module) = cached
            && module.source_hash == hash
        {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(module);
        }

        self.parses.fetch_add(1, Ordering::Relaxed);
        let module = Arc::new(transformer.transform_source(path, source)?);
        self.modules.insert(path.to_string(), Arc::clone(&module));
        Ok(module)
    }

    /// Last successfully compiled module for `path`, fresh or not.
    pub fn get(&self, path: &str) -> Option<Arc<TransformedModule>> {
        self.modules.get(path).map(|entry| Arc::clone(entry.value()))
    }

    /// Drop entries whose path no longer qualifies.
    pub fn retain(&self, mut keep: impl FnMut(&str) -> bool) {
        self.modules.retain(|path, _| keep(path));
    }

    pub fn clear(&self) {
        self.modules.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            parses: self.parses.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            entries: self.modules.len(),
        }
    }
}
