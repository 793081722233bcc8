//! Preview document assembly.
//!
//! The document is self-contained apart from the module URLs in its import
//! map: boot script with the global error listeners, the import map,
//! collected stylesheets, and the runtime module that mounts the entry
//! under an error boundary.

use serde::Serialize;

use crate::core::RenderGeneration;
use crate::embed::preview::{DOCUMENT_HTML, DocumentVars};
use crate::importmap::{ImportMap, Stylesheet};
use crate::utils::html::{escape, escape_attr, escape_json_script, escape_raw_text};

/// A rendered preview, ready to load into a fresh sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewDocument {
    pub generation: RenderGeneration,
    /// Entry file path.
    pub entry: String,
    pub html: String,
    pub import_map: ImportMap,
    /// Non-fatal traversal warnings (unresolved imports and the like).
    pub warnings: Vec<String>,
}

/// Everything besides the import map that goes into a document.
#[derive(Debug, Clone, Copy)]
pub struct Assembly<'a> {
    pub generation: RenderGeneration,
    pub title: &'a str,
    pub entry: &'a str,
    /// Specifier the runtime imports to load `entry`.
    pub entry_specifier: &'a str,
    pub stylesheets: &'a [Stylesheet],
}

#[derive(Serialize)]
struct Boot<'a> {
    generation: RenderGeneration,
    entry: &'a str,
}

/// Build the document for one committed pass.
pub fn assemble(import_map: ImportMap, parts: &Assembly<'_>) -> PreviewDocument {
    let boot = serde_json::to_string(&Boot {
        generation: parts.generation,
        entry: parts.entry_specifier,
    })
    .unwrap_or_else(|_| "{}".to_string());
    let map_json = import_map.to_json();

    let html = DOCUMENT_HTML.render(&DocumentVars {
        title: &escape(parts.title),
        boot: &escape_json_script(&boot),
        import_map: &escape_json_script(&map_json),
        styles: &style_tags(parts.stylesheets),
    });

    PreviewDocument {
        generation: parts.generation,
        entry: parts.entry.to_string(),
        html,
        import_map,
        warnings: Vec::new(),
    }
}

fn style_tags(sheets: &[Stylesheet]) -> String {
    let mut out = String::new();
    for sheet in sheets {
        match sheet {
            Stylesheet::Inline { path, css } => {
                out.push_str(&format!(
                    "<style data-kiln-path=\"{}\">\n{}\n</style>\n",
                    escape_attr(path),
                    escape_raw_text(css)
                ));
            }
            Stylesheet::External { url } => {
                out.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", escape_attr(url)));
            }
        }
    }
    out
}
