//! Per-file module transformation.
//!
//! One source file in, one browser-ready ES module body out:
//!
//! - `.jsx` / `.js` / `.tsx` / `.ts` are parsed with oxc, TypeScript is
//!   stripped and JSX is lowered to the automatic runtime
//!   (`react/jsx-runtime`)
//! - `.json` becomes `export default <value>`
//! - anything else becomes `export default "<text>"`
//!
//! Local specifiers in the output are rewritten to their alias-qualified
//! form and stylesheet imports are lifted out of the body. Transformation is
//! pure source-to-source; nothing is ever executed.

mod cache;
mod diagnostic;
mod imports;

#[cfg(test)]
mod tests;

pub use cache::{CacheStats, ModuleCache};
pub use diagnostic::{SyntaxDiagnostic, line_column};
pub use imports::is_stylesheet;

use std::path::Path;
use std::sync::Arc;

use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{JsxRuntime, TransformOptions, Transformer};

use crate::freshness::{ContentHash, hash_str};
use crate::resolve::DEFAULT_ALIAS;
use crate::vfs::{FileNode, path};

/// A compiled module, valid while `source_hash` matches the file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedModule {
    pub source_path: String,
    pub source_hash: ContentHash,
    pub compiled_body: Arc<str>,
    /// Value imports as written, first-occurrence order, then runtime
    /// imports injected by JSX lowering.
    pub import_specifiers: Vec<String>,
    /// Stylesheet imports lifted out of the body, as written.
    pub stylesheets: Vec<String>,
    /// Hash of `compiled_body`; stable handle for blob hosts.
    pub blob_identity: ContentHash,
}

impl TransformedModule {
    /// Whether this module was compiled from exactly `source`.
    #[inline]
    pub fn is_fresh(&self, source: &str) -> bool {
        self.source_hash == hash_str(source)
    }
}

/// How a file is turned into a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceFormat {
    Script(SourceType),
    Json,
    Text,
}

impl SourceFormat {
    fn of(file: &str) -> Self {
        match path::extension(file).map(str::to_ascii_lowercase).as_deref() {
            Some("ts" | "mts" | "cts") => Self::Script(SourceType::ts()),
            Some("tsx") => Self::Script(SourceType::tsx()),
            Some("js" | "jsx" | "mjs" | "cjs") => Self::Script(SourceType::jsx()),
            Some("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Output of compiling one script.
struct Compiled {
    code: String,
    specifiers: Vec<String>,
    stylesheets: Vec<String>,
}

/// Compiles single files. Stateless apart from the alias prefix.
#[derive(Debug, Clone)]
pub struct ModuleTransformer {
    alias: String,
}

impl Default for ModuleTransformer {
    fn default() -> Self {
        Self::new(DEFAULT_ALIAS)
    }
}

impl ModuleTransformer {
    pub fn new(alias: impl Into<String>) -> Self {
        Self { alias: alias.into() }
    }

    #[inline]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Transform a file node. Directories compile to an empty module.
    pub fn transform(&self, node: &FileNode) -> Result<TransformedModule, SyntaxDiagnostic> {
        self.transform_source(node.path(), node.content().unwrap_or_default())
    }

    /// Transform `source` as if it lived at `path`.
    pub fn transform_source(&self, path: &str, source: &str) -> Result<TransformedModule, SyntaxDiagnostic> {
        let compiled = match SourceFormat::of(path) {
            SourceFormat::Script(source_type) => self.compile_script(path, source, source_type)?,
            SourceFormat::Json => Compiled::leaf(json_module(path, source)?),
            SourceFormat::Text => Compiled::leaf(text_module(source)),
        };

        let compiled_body: Arc<str> = compiled.code.into();
        crate::debug!("transform"; "{} -> {} bytes", path, compiled_body.len());
        Ok(TransformedModule {
            source_path: path.to_string(),
            source_hash: hash_str(source),
            blob_identity: hash_str(&compiled_body),
            compiled_body,
            import_specifiers: compiled.specifiers,
            stylesheets: compiled.stylesheets,
        })
    }

    fn compile_script(
        &self,
        path: &str,
        source: &str,
        source_type: SourceType,
    ) -> Result<Compiled, SyntaxDiagnostic> {
        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, source, source_type).parse();
        if let Some(error) = parsed.errors.first() {
            return Err(SyntaxDiagnostic::from_oxc(path, source, error));
        }
        if parsed.panicked {
            return Err(SyntaxDiagnostic::at_offset(path, source, 0, "unable to parse module"));
        }
        let mut program = parsed.program;

        let stylesheets = imports::take_stylesheets(&mut program);
        let mut specifiers = imports::collect(&program);

        let semantic = SemanticBuilder::new().with_check_syntax_error(true).build(&program);
        if let Some(error) = semantic.errors.first() {
            return Err(SyntaxDiagnostic::from_oxc(path, source, error));
        }
        let scoping = semantic.semantic.into_scoping();

        let transformed = Transformer::new(&allocator, Path::new(path), &transform_options())
            .build_with_scoping(scoping, &mut program);
        if let Some(error) = transformed.errors.first() {
            return Err(SyntaxDiagnostic::from_oxc(path, source, error));
        }

        // JSX lowering injects its runtime import at the top.
        for injected in imports::collect(&program) {
            if !specifiers.contains(&injected) {
                specifiers.push(injected);
            }
        }
        imports::rewrite_local(&mut program, &allocator, path, &self.alias);

        Ok(Compiled {
            code: Codegen::new().build(&program).code,
            specifiers,
            stylesheets,
        })
    }
}

impl Compiled {
    fn leaf(code: String) -> Self {
        Self {
            code,
            specifiers: Vec::new(),
            stylesheets: Vec::new(),
        }
    }
}

fn transform_options() -> TransformOptions {
    let mut options = TransformOptions::default();
    options.jsx.runtime = JsxRuntime::Automatic;
    options.jsx.development = false;
    options
}

fn json_module(path: &str, source: &str) -> Result<String, SyntaxDiagnostic> {
    let value: serde_json::Value = serde_json::from_str(source).map_err(|err| SyntaxDiagnostic {
        path: path.to_string(),
        message: format!("invalid JSON: {err}"),
        line: err.line().max(1),
        column: err.column().max(1),
        help: None,
    })?;
    Ok(format!("export default {value};\n"))
}

fn text_module(source: &str) -> String {
    // A JSON string literal is a valid JavaScript string literal.
    let literal = serde_json::Value::String(source.to_string());
    format!("export default {literal};\n")
}
