//! Preview server with live reload support.
//!
//! Routes:
//!
//! | Method | Path                   | Response                               |
//! |--------|------------------------|----------------------------------------|
//! | GET    | `/`                    | host page (frame, problems panel)      |
//! | GET    | `/__kiln/doc/<gen>`    | preview document of that generation    |
//! | GET    | `/__kiln/blob/<id>.js` | one compiled module                    |
//! | POST   | `/__kiln/tool`         | apply editor tool calls                |
//! | POST   | `/__kiln/report`       | sandbox report relayed by the host     |
//! | GET    | `/__kiln/export`       | project as flat JSON                   |
//! | GET    | `/__kiln/status`       | generations, blobs, runtime errors     |

mod lifecycle;
mod response;
mod state;

#[cfg(test)]
mod tests;

pub use state::{DOCUMENT_ROUTE, ServeState, ServeStatus, document_url};

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use crossbeam::channel::{self, Receiver, RecvTimeoutError};
use serde_json::json;
use tiny_http::{Method, Request, Server};

use super::common::load_project;
use crate::config::cfg;
use crate::core::{RenderGeneration, is_shutdown, set_serving};
use crate::preview::BLOB_ROUTE;
use crate::reload::LiveReload;
use crate::sandbox::SandboxReport;
use crate::vfs::StoreEvent;
use crate::{debug, log};

/// Default WebSocket port for live reload
pub const DEFAULT_WS_PORT: u16 = 35729;

/// Request bodies above this size are rejected.
const MAX_BODY: u64 = 16 * 1024 * 1024;

/// How often the render worker checks for shutdown while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Serve the project at `project` until Ctrl+C.
///
/// Edits arriving through `/__kiln/tool` are written back to the project
/// file on exit (unless it was read from stdin). Settings come from the
/// global config installed by `init_config`.
pub fn serve_project(project: PathBuf) -> Result<()> {
    let config = cfg();
    let store = load_project(&project)?;

    let reload = if config.serve.watch {
        Some(LiveReload::start(DEFAULT_WS_PORT)?)
    } else {
        None
    };
    let (state, events) = ServeState::new(store, &config, reload);
    state.render();

    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    lifecycle::register_server_for_shutdown(Arc::clone(&server), shutdown_tx);

    let worker = spawn_render_worker(Arc::clone(&state), events, shutdown_rx);
    set_serving();
    log!("serve"; "http://{}", addr);

    run_request_loop(&server, &state)?;
    lifecycle::wait_for_shutdown(Some(worker));

    save_on_exit(&state, &project)
}

fn save_on_exit(state: &ServeState, project: &Path) -> Result<()> {
    if project.as_os_str() == "-" {
        if state.is_dirty() {
            log!("warning"; "project was read from stdin, edits are not saved");
        }
        return Ok(());
    }
    if state.save_if_dirty(project)? {
        log!("serve"; "saved {}", project.display());
    }
    Ok(())
}

// =============================================================================
// Render worker
// =============================================================================

fn spawn_render_worker(
    state: Arc<ServeState>,
    events: Receiver<StoreEvent>,
    shutdown_rx: Receiver<()>,
) -> JoinHandle<()> {
    thread::spawn(move || render_loop(&state, &events, &shutdown_rx))
}

/// Re-render after every burst of store mutations.
fn render_loop(state: &ServeState, events: &Receiver<StoreEvent>, shutdown_rx: &Receiver<()>) {
    loop {
        if is_shutdown() || shutdown_rx.try_recv().is_ok() {
            break;
        }
        match events.recv_timeout(POLL_INTERVAL) {
            Ok(first) => {
                let mut latest = first;
                let mut count = 1;
                while let Ok(next) = events.try_recv() {
                    latest = next;
                    count += 1;
                }
                debug!("preview"; "{} change(s), latest {:?} at {}", count, latest.change, latest.generation);
                state.render();
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

// =============================================================================
// Requests
// =============================================================================

fn run_request_loop(server: &Server, state: &Arc<ServeState>) -> Result<()> {
    // Pool so a slow tool call does not block blob fetches.
    let pool = rayon::ThreadPoolBuilder::new().num_threads(4).build()?;

    for request in server.incoming_requests() {
        let state = Arc::clone(state);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &state) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(mut request: Request, state: &ServeState) -> Result<()> {
    if is_shutdown() {
        return response::respond_unavailable(request);
    }

    let url = request.url().to_string();
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let method = request.method().clone();

    match (&method, path) {
        (Method::Get, "/" | "/index.html") => response::respond_html(request, state.host_page()),
        (Method::Get, _) if path.starts_with(DOCUMENT_ROUTE) => {
            let document = path[DOCUMENT_ROUTE.len()..]
                .parse::<u64>()
                .ok()
                .and_then(|n| state.document(RenderGeneration::new(n)));
            match document {
                Some(document) => response::respond_document(request, &document.html),
                None => response::respond_text(request, 410, "410 Gone: superseded by a newer preview"),
            }
        }
        (Method::Get, _) if path.starts_with(BLOB_ROUTE) => match state.blob(&path[BLOB_ROUTE.len()..]) {
            Some(body) => response::respond_blob(request, &body),
            None => response::respond_not_found(request),
        },
        (Method::Post, "/__kiln/tool") => {
            let body = read_body(&mut request)?;
            match state.apply_tools(&body) {
                Ok(results) => response::respond_json(request, 200, &results),
                Err(e) => response::respond_json(
                    request,
                    400,
                    &json!({ "success": false, "message": format!("invalid tool call: {e}") }),
                ),
            }
        }
        (Method::Post, "/__kiln/report") => {
            let body = read_body(&mut request)?;
            match SandboxReport::from_json(&body) {
                Some(report) => {
                    state.receive_report(report);
                    response::respond_no_content(request)
                }
                None => response::respond_text(request, 400, "400 Bad Request: not a sandbox report"),
            }
        }
        (Method::Get, "/__kiln/export") => {
            let flat: serde_json::Value = serde_json::from_str(&state.export()?)?;
            response::respond_json(request, 200, &flat)
        }
        (Method::Get, "/__kiln/status") => response::respond_json(request, 200, &state.status()),
        _ => response::respond_not_found(request),
    }
}

fn read_body(request: &mut Request) -> Result<String> {
    let mut body = String::new();
    request.as_reader().take(MAX_BODY).read_to_string(&mut body)?;
    Ok(body)
}
