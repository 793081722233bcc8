//! `kiln apply`: run editor tool calls against a project file.

use std::path::Path;

use anyhow::{Context, Result};

use super::common::{load_project, read_input, save_project, write_output};
use crate::log;
use crate::tools::{ToolCall, ToolResult, apply_all};

/// Apply the calls in `calls` to `project`. Results are printed as JSON.
///
/// The project file is written back unless `dry`, and only if a call
/// changed something.
pub fn apply_calls(project: &Path, calls: &Path, dry: bool) -> Result<Vec<ToolResult>> {
    let mut store = load_project(project)?;
    let calls = ToolCall::parse_many(&read_input(calls)?).context("Failed to parse tool calls")?;

    let before = store.revision();
    let results = apply_all(&mut store, &calls);
    let failed = results.iter().filter(|r| !r.success).count();

    write_output(None, &(serde_json::to_string_pretty(&results)? + "\n"))?;

    if failed > 0 {
        log!("warning"; "{} of {} calls failed", failed, results.len());
    }
    if !dry && store.revision() != before {
        save_project(project, &store)?;
        log!("apply"; "wrote {}", project.display());
    }
    Ok(results)
}
