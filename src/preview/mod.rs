//! The render pipeline: snapshot → traversal → bind → assemble.
//!
//! # Generations
//!
//! `begin` advances the store's `GenerationClock` from the snapshot's own
//! generation and stamps the pass with the new value; a snapshot the clock
//! has already moved past is rejected as stale. Every later step (each traversal step, and commit) checks
//! that the clock still reads that value; any store mutation or newer pass
//! in between makes the pass stale and its results are dropped with
//! `PreviewError::Stale`. Blob handles are only issued at commit, so a
//! stale pass never holds any.
//!
//! # Leases
//!
//! A committed pass keeps its blob handles until the sandbox confirms a
//! newer generation loaded (`confirm_loaded`); then every older lease is
//! released. A commit also releases every lease except its own, the one it
//! replaces as last good, and the last loaded one, so leases stay bounded
//! when no sandbox ever reports.
//!
//! # Module Structure
//!
//! - `assemble` - HTML document synthesis
//! - `blob` - blob hosts (`data:` URLs, served table)

mod assemble;
mod blob;

#[cfg(test)]
mod tests;

pub use assemble::{Assembly, PreviewDocument, assemble};
pub use blob::{BLOB_ROUTE, BlobHost, BlobId, BlobTable, InlineBlobs, ServedBlobs, data_url, lookup};

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::core::{GenerationClock, RenderGeneration};
use crate::importmap::{BuildError, ImportMapBuilder, ModuleGraph};
use crate::transform::SyntaxDiagnostic;
use crate::vfs::{FileStore, StoreSnapshot};

/// Default preview entry.
pub const DEFAULT_ENTRY: &str = "/App.jsx";

/// Why a pass produced no document.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreviewError {
    #[error("entry file `{path}` does not exist")]
    MissingEntry { path: String },

    #[error("{diagnostic}")]
    Syntax { diagnostic: SyntaxDiagnostic },

    /// Superseded by a store mutation or a newer pass. Never shown.
    #[error("render pass {generation} was superseded")]
    Stale { generation: RenderGeneration },
}

impl PreviewError {
    #[inline]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }

    /// The syntax diagnostic, if that is what failed.
    pub fn diagnostic(&self) -> Option<&SyntaxDiagnostic> {
        match self {
            Self::Syntax { diagnostic } => Some(diagnostic),
            _ => None,
        }
    }
}

// =============================================================================
// RenderPass
// =============================================================================

/// One in-flight render, pinned to a snapshot and a generation.
#[derive(Debug)]
pub struct RenderPass {
    generation: RenderGeneration,
    clock: GenerationClock,
    snapshot: StoreSnapshot,
    entry: String,
}

impl RenderPass {
    #[inline]
    pub fn generation(&self) -> RenderGeneration {
        self.generation
    }

    #[inline]
    pub fn entry(&self) -> &str {
        &self.entry
    }

    #[inline]
    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.snapshot
    }

    /// Whether no mutation or newer pass happened since `begin`.
    #[inline]
    pub fn is_current(&self) -> bool {
        self.clock.is_current(self.generation)
    }

    /// Traverse the snapshot. Checks currency before every module.
    pub fn build(self, builder: &ImportMapBuilder) -> Result<BuiltPass, PreviewError> {
        let graph = builder
            .traverse(&self.entry, &self.snapshot, || self.is_current())
            .map_err(|err| match err {
                BuildError::MissingEntry(path) => PreviewError::MissingEntry { path },
                BuildError::Syntax(diagnostic) => PreviewError::Syntax { diagnostic },
                BuildError::Interrupted => PreviewError::Stale {
                    generation: self.generation,
                },
            })?;
        Ok(BuiltPass { pass: self, graph })
    }
}

/// A traversed pass waiting for commit.
#[derive(Debug)]
pub struct BuiltPass {
    pass: RenderPass,
    graph: ModuleGraph,
}

impl BuiltPass {
    #[inline]
    pub fn generation(&self) -> RenderGeneration {
        self.pass.generation
    }

    #[inline]
    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    #[inline]
    pub fn is_current(&self) -> bool {
        self.pass.is_current()
    }
}

// =============================================================================
// RenderPipeline
// =============================================================================

/// Owns the builder, the blob host and the committed state for one project
/// view. Reads the store; never mutates it.
#[derive(Debug)]
pub struct RenderPipeline<B: BlobHost> {
    builder: ImportMapBuilder,
    clock: GenerationClock,
    blobs: B,
    title: String,
    leases: BTreeMap<RenderGeneration, Vec<BlobId>>,
    loaded: Option<RenderGeneration>,
    last_good: Option<Arc<PreviewDocument>>,
    last_error: Option<PreviewError>,
}

impl<B: BlobHost> RenderPipeline<B> {
    /// Pipeline sharing `clock` with the store it renders.
    pub fn new(builder: ImportMapBuilder, clock: GenerationClock, blobs: B) -> Self {
        Self {
            builder,
            clock,
            blobs,
            title: "Preview".to_string(),
            leases: BTreeMap::new(),
            loaded: None,
            last_good: None,
            last_error: None,
        }
    }

    /// Pipeline for `store`'s clock.
    pub fn for_store(store: &FileStore, builder: ImportMapBuilder, blobs: B) -> Self {
        Self::new(builder, store.clock().clone(), blobs)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[inline]
    pub fn builder(&self) -> &ImportMapBuilder {
        &self.builder
    }

    #[inline]
    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Most recent committed document.
    #[inline]
    pub fn last_good(&self) -> Option<&Arc<PreviewDocument>> {
        self.last_good.as_ref()
    }

    /// Failure of the most recent non-stale pass, cleared by a commit.
    #[inline]
    pub fn last_error(&self) -> Option<&PreviewError> {
        self.last_error.as_ref()
    }

    /// Generations still holding blob handles.
    pub fn leased_generations(&self) -> Vec<RenderGeneration> {
        self.leases.keys().copied().collect()
    }

    /// Start a pass over `snapshot`. Fails if the store or another pass
    /// moved the clock since the snapshot was taken.
    pub fn begin(&self, snapshot: StoreSnapshot, entry: &str) -> Result<RenderPass, PreviewError> {
        let taken = snapshot.generation();
        let generation = self
            .clock
            .advance_from(taken)
            .ok_or(PreviewError::Stale { generation: taken })?;
        crate::debug!("preview"; "begin {} for {}", generation, entry);
        Ok(RenderPass {
            generation,
            clock: self.clock.clone(),
            snapshot,
            entry: entry.to_string(),
        })
    }

    /// Issue blobs, assemble, and publish. Stale passes are rejected before
    /// anything is issued.
    pub fn commit(&mut self, built: BuiltPass) -> Result<Arc<PreviewDocument>, PreviewError> {
        let generation = built.generation();
        if !built.is_current() {
            crate::debug!("preview"; "dropping stale {}", generation);
            return Err(PreviewError::Stale { generation });
        }

        let bound = self.builder.bind(&built.graph, &mut self.blobs);
        let mut document = assemble(
            bound.import_map,
            &Assembly {
                generation,
                title: &self.title,
                entry: built.graph.entry(),
                entry_specifier: &bound.entry_specifier,
                stylesheets: built.graph.stylesheets(),
            },
        );
        document.warnings = built.graph.warnings().to_vec();

        let replaced = self.last_good.as_ref().map(|document| document.generation);
        let loaded = self.loaded;
        self.leases.insert(generation, bound.leases);
        self.release_leases(|held| held != generation && Some(held) != replaced && Some(held) != loaded);

        let document = Arc::new(document);
        self.last_good = Some(Arc::clone(&document));
        self.last_error = None;
        crate::debug!(
            "preview";
            "committed {} ({} modules, {} live blobs)",
            generation,
            built.graph.modules().len(),
            self.blobs.live()
        );
        Ok(document)
    }

    /// Snapshot `store` and run a whole pass.
    pub fn render(&mut self, store: &FileStore, entry: &str) -> Result<Arc<PreviewDocument>, PreviewError> {
        self.render_snapshot(store.snapshot(), entry)
    }

    /// Run a whole pass over an already taken snapshot.
    pub fn render_snapshot(
        &mut self,
        snapshot: StoreSnapshot,
        entry: &str,
    ) -> Result<Arc<PreviewDocument>, PreviewError> {
        let result = self
            .begin(snapshot, entry)
            .and_then(|pass| pass.build(&self.builder))
            .and_then(|built| self.commit(built));
        if let Err(err) = &result
            && !err.is_stale()
        {
            self.last_error = Some(err.clone());
        }
        result
    }

    /// The sandbox for `generation` loaded: release every older lease.
    pub fn confirm_loaded(&mut self, generation: RenderGeneration) -> usize {
        self.loaded = Some(generation);
        let count = self.release_leases(|held| held >= generation);
        if count > 0 {
            crate::debug!("preview"; "released {} blob handles before {}", count, generation);
        }
        count
    }

    /// Release every lease whose generation `keep` rejects.
    fn release_leases(&mut self, keep: impl Fn(RenderGeneration) -> bool) -> usize {
        let mut count = 0;
        self.leases.retain(|held, ids| {
            if keep(*held) {
                return true;
            }
            for id in ids.drain(..) {
                self.blobs.release(id);
                count += 1;
            }
            false
        });
        count
    }
}

/// Render `entry` once into a self-contained document (`data:` modules).
pub fn render_preview(
    store: &FileStore,
    builder: ImportMapBuilder,
    entry: &str,
) -> Result<PreviewDocument, PreviewError> {
    let mut pipeline = RenderPipeline::for_store(store, builder, InlineBlobs::new());
    pipeline
        .render(store, entry)
        .map(Arc::unwrap_or_clone)
}
