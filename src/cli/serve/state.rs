//! Shared state of a running preview server.
//!
//! Lock order: `pipeline` before `store` and `monitor`; `store` is never
//! held while taking another lock.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use parking_lot::Mutex;
use serde::Serialize;

use crate::cli::common::save_project;
use crate::config::KilnConfig;
use crate::core::RenderGeneration;
use crate::logger::{status_error, status_success_with_warnings, status_warning};
use crate::preview::{BlobTable, PreviewDocument, RenderPipeline, ServedBlobs, lookup};
use crate::reload::{LiveReload, ReloadMessage};
use crate::sandbox::{MonitorOutcome, SandboxMonitor, SandboxReport, SandboxRuntimeError, host_page};
use crate::tools::{ToolCall, ToolResult, apply_all};
use crate::vfs::{FileStore, StoreEvent, flat_to_json};

/// Route preview documents are served from.
pub const DOCUMENT_ROUTE: &str = "/__kiln/doc/";

/// URL of the document committed for `generation`.
pub fn document_url(generation: RenderGeneration) -> String {
    format!("{DOCUMENT_ROUTE}{}", generation.get())
}

/// Snapshot of the server for `/__kiln/status`.
#[derive(Debug, Serialize)]
pub struct ServeStatus {
    /// Current store generation.
    pub generation: RenderGeneration,
    /// Generation of the last good preview.
    pub rendered: Option<RenderGeneration>,
    /// Non-fatal warnings of the last good preview.
    pub warnings: Vec<String>,
    pub mounted: Option<RenderGeneration>,
    pub loaded: bool,
    pub live_blobs: usize,
    pub leased: Vec<RenderGeneration>,
    pub runtime_errors: Vec<SandboxRuntimeError>,
    pub last_error: Option<String>,
    pub clients: usize,
}

pub struct ServeState {
    store: Mutex<FileStore>,
    pipeline: Mutex<RenderPipeline<ServedBlobs>>,
    blobs: BlobTable,
    monitor: Mutex<SandboxMonitor>,
    last: Mutex<Option<ReloadMessage>>,
    reload: Option<LiveReload>,
    entry: String,
    title: String,
    loaded_at: u64,
}

impl ServeState {
    /// Wrap `store`; the receiver carries every later store mutation.
    pub fn new(
        mut store: FileStore,
        config: &KilnConfig,
        reload: Option<LiveReload>,
    ) -> (Arc<Self>, Receiver<StoreEvent>) {
        let events = store.subscribe();
        let blobs = ServedBlobs::new();
        let table = blobs.table();
        let pipeline = RenderPipeline::for_store(&store, config.builder(), blobs).with_title(&config.preview.title);

        let state = Self {
            loaded_at: store.revision(),
            store: Mutex::new(store),
            pipeline: Mutex::new(pipeline),
            blobs: table,
            monitor: Mutex::new(SandboxMonitor::new()),
            last: Mutex::new(None),
            reload,
            entry: config.preview.entry.clone(),
            title: config.preview.title.clone(),
        };
        (Arc::new(state), events)
    }

    /// Render the current store and publish the outcome.
    ///
    /// Returns the committed generation, `None` when the pass failed or was
    /// overtaken by a newer mutation.
    pub fn render(&self) -> Option<RenderGeneration> {
        let mut pipeline = self.pipeline.lock();
        let snapshot = self.store.lock().snapshot();

        match pipeline.render_snapshot(snapshot, &self.entry) {
            Ok(document) => {
                let generation = document.generation;
                self.monitor.lock().mount(generation);
                status_success_with_warnings(
                    &format!("rendered {} ({} imports)", generation, document.import_map.len()),
                    &document.warnings,
                );
                self.publish(ReloadMessage::render(generation, document_url(generation)));
                Some(generation)
            }
            Err(err) if err.is_stale() => {
                crate::debug!("preview"; "{}", err);
                None
            }
            Err(err) => {
                status_error("render failed", &err.to_string());
                if let Some(message) = ReloadMessage::from_failure(&err) {
                    self.publish(message);
                }
                None
            }
        }
    }

    fn publish(&self, message: ReloadMessage) {
        *self.last.lock() = Some(message.clone());
        if let Some(reload) = &self.reload {
            reload.broadcast(message);
        }
    }

    /// Last render or failure message.
    pub fn last_message(&self) -> Option<ReloadMessage> {
        self.last.lock().clone()
    }

    /// Host page, primed with the last message so a reload shows the
    /// current state before the socket connects.
    pub fn host_page(&self) -> String {
        let initial = self
            .last_message()
            .map(|message| message.to_json())
            .unwrap_or_else(|| "null".to_string());
        host_page(&self.title, &initial, self.reload.as_ref().map(LiveReload::port))
    }

    /// The last good document, if it belongs to `generation`.
    pub fn document(&self, generation: RenderGeneration) -> Option<Arc<PreviewDocument>> {
        self.pipeline
            .lock()
            .last_good()
            .filter(|document| document.generation == generation)
            .cloned()
    }

    /// Body of a served module blob (`<hex>.js`).
    pub fn blob(&self, file: &str) -> Option<Arc<str>> {
        lookup(&self.blobs, file)
    }

    /// Apply tool calls to the store. Mutations reach the render worker
    /// through the store's event channel.
    pub fn apply_tools(&self, json: &str) -> serde_json::Result<Vec<ToolResult>> {
        let calls = ToolCall::parse_many(json)?;
        let results = apply_all(&mut self.store.lock(), &calls);
        for result in results.iter().filter(|result| !result.success) {
            crate::debug!("tools"; "{}", result.message);
        }
        Ok(results)
    }

    /// Feed a sandbox report to the monitor and act on it.
    pub fn receive_report(&self, report: SandboxReport) -> MonitorOutcome {
        let outcome = self.monitor.lock().receive(report);
        match &outcome {
            MonitorOutcome::Loaded(generation) => {
                self.pipeline.lock().confirm_loaded(*generation);
                crate::debug!("sandbox"; "{} loaded", generation);
            }
            MonitorOutcome::Recorded => {
                if let Some(error) = self.monitor.lock().errors().last() {
                    status_warning(&format!("[{}] {}", error.kind.as_str(), error.message));
                }
            }
            MonitorOutcome::Discarded => {}
        }
        outcome
    }

    /// The store as flat project JSON.
    pub fn export(&self) -> serde_json::Result<String> {
        flat_to_json(&self.store.lock().export_flat())
    }

    pub fn status(&self) -> ServeStatus {
        let generation = self.store.lock().generation();
        let (rendered, warnings, live_blobs, leased, last_error) = {
            let pipeline = self.pipeline.lock();
            (
                pipeline.last_good().map(|document| document.generation),
                pipeline
                    .last_good()
                    .map(|document| document.warnings.clone())
                    .unwrap_or_default(),
                self.blobs.len(),
                pipeline.leased_generations(),
                pipeline.last_error().map(ToString::to_string),
            )
        };
        let monitor = self.monitor.lock();
        ServeStatus {
            generation,
            rendered,
            warnings,
            mounted: monitor.mounted(),
            loaded: monitor.is_loaded(),
            live_blobs,
            leased,
            runtime_errors: monitor.errors().to_vec(),
            last_error,
            clients: self.reload.as_ref().map_or(0, LiveReload::client_count),
        }
    }

    /// Whether the store changed since it was loaded.
    pub fn is_dirty(&self) -> bool {
        self.store.lock().revision() != self.loaded_at
    }

    /// Write the store back to `path` if it changed.
    pub fn save_if_dirty(&self, path: &Path) -> Result<bool> {
        if !self.is_dirty() {
            return Ok(false);
        }
        save_project(path, &self.store.lock())?;
        Ok(true)
    }
}
