//! `kiln check`: transform everything reachable and report.

use std::path::Path;

use anyhow::Result;
use serde_json::json;

use super::common::{load_project, write_output};
use super::render::report_failure;
use crate::config::KilnConfig;
use crate::importmap::{BuildError, ModuleGraph, Stylesheet};
use crate::log;
use crate::preview::PreviewError;

/// Check the project at `project`, printing a summary (or JSON).
pub fn check_project(config: &KilnConfig, project: &Path, as_json: bool) -> Result<()> {
    let store = load_project(project)?;
    let builder = config.builder();

    let graph = builder
        .build(&config.preview.entry, &store.snapshot())
        .map_err(|err| match err {
            BuildError::MissingEntry(path) => report_failure(&PreviewError::MissingEntry { path }),
            BuildError::Syntax(diagnostic) => report_failure(&PreviewError::Syntax { diagnostic }),
            BuildError::Interrupted => anyhow::anyhow!("traversal interrupted"),
        })?;

    if as_json {
        let text = serde_json::to_string_pretty(&graph_json(&graph))?;
        return write_output(None, &(text + "\n"));
    }

    for warning in graph.warnings() {
        log!("warning"; "{}", warning);
    }
    log!(
        "check";
        "{}: {} local, {} packages, {} stylesheets, {} unresolved",
        graph.entry(),
        graph.modules().len(),
        graph.externals().count(),
        graph.stylesheets().len(),
        graph.placeholders().count()
    );
    Ok(())
}

/// Module graph as JSON: modules with their keys, imports and dependents.
pub fn graph_json(graph: &ModuleGraph) -> serde_json::Value {
    let modules: Vec<_> = graph
        .modules()
        .iter()
        .map(|m| {
            json!({
                "path": m.path,
                "keys": m.keys,
                "imports": m.module.import_specifiers,
                "dependents": graph.dependents(&m.path),
            })
        })
        .collect();
    let stylesheets: Vec<_> = graph
        .stylesheets()
        .iter()
        .map(|sheet| match sheet {
            Stylesheet::Inline { path, .. } => json!({ "path": path }),
            Stylesheet::External { url } => json!({ "url": url }),
        })
        .collect();

    json!({
        "entry": graph.entry(),
        "modules": modules,
        "packages": graph.externals().collect::<Vec<_>>(),
        "unresolved": graph.placeholders().collect::<Vec<_>>(),
        "stylesheets": stylesheets,
        "warnings": graph.warnings(),
    })
}
