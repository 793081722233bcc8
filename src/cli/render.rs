//! `kiln render`: one self-contained preview document.

use std::path::Path;

use anyhow::Result;

use super::common::{load_project, write_output};
use crate::config::KilnConfig;
use crate::log;
use crate::preview::{InlineBlobs, PreviewError, RenderPipeline};

/// Render the project at `project` to `output` (stdout when `None`).
///
/// Modules are inlined as `data:` URLs, so the document works from a file.
pub fn render_project(config: &KilnConfig, project: &Path, output: Option<&Path>) -> Result<()> {
    let store = load_project(project)?;
    let mut pipeline =
        RenderPipeline::for_store(&store, config.builder(), InlineBlobs::new()).with_title(&config.preview.title);

    let document = match pipeline.render(&store, &config.preview.entry) {
        Ok(document) => document,
        Err(err) => return Err(report_failure(&err)),
    };

    for warning in &document.warnings {
        log!("warning"; "{}", warning);
    }
    write_output(output, &document.html)?;
    if let Some(path) = output {
        log!(
            "render";
            "{} -> {} ({} modules)",
            document.entry,
            path.display(),
            pipeline.builder().cache().stats().entries
        );
    }
    Ok(())
}

/// Turn a failed pass into a CLI error, printing syntax help if any.
pub(super) fn report_failure(err: &PreviewError) -> anyhow::Error {
    if let Some(help) = err.diagnostic().and_then(|d| d.help.as_deref()) {
        log!("hint"; "{}", help);
    }
    match err {
        PreviewError::Syntax { .. } => anyhow::anyhow!("syntax error: {err}"),
        _ => anyhow::anyhow!("{err}"),
    }
}
