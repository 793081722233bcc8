//! `[preview]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [preview]
//! entry = "/App.jsx"                          # Module mounted in the sandbox
//! alias = "@/"                                # Prefix meaning "project root"
//! extensions = [".tsx", ".ts", ".jsx", ".js"] # Probe order for bare paths
//! title = "Preview"                           # Document title
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::preview::DEFAULT_ENTRY;
use crate::resolve::{DEFAULT_ALIAS, DEFAULT_EXTENSIONS, ResolverOptions};

/// Preview pipeline settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub entry: String,
    pub alias: String,
    pub extensions: Vec<String>,
    pub title: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            entry: DEFAULT_ENTRY.to_string(),
            alias: DEFAULT_ALIAS.to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            title: "Preview".to_string(),
        }
    }
}

impl PreviewConfig {
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            alias: self.alias.clone(),
            extensions: self.extensions.clone(),
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if crate::vfs::path::normalize(&self.entry).is_err() {
            diag.error(FieldPath::new("preview.entry"), format!("`{}` is not a valid project path", self.entry));
        }

        if self.alias.is_empty() || !self.alias.ends_with('/') {
            diag.error_with_hint(
                FieldPath::new("preview.alias"),
                format!("alias `{}` must end with `/`", self.alias),
                "use a prefix such as \"@/\" or \"~/\"",
            );
        } else if self.alias.starts_with('.') || self.alias.starts_with('/') {
            diag.error(
                FieldPath::new("preview.alias"),
                "alias must not look like a relative or absolute path",
            );
        }

        if self.extensions.is_empty() {
            diag.error(FieldPath::new("preview.extensions"), "at least one extension is required");
        }
        for ext in &self.extensions {
            if !ext.starts_with('.') || ext.len() < 2 || ext[1..].contains(['.', '/']) {
                diag.error_with_hint(
                    FieldPath::new("preview.extensions"),
                    format!("invalid extension `{ext}`"),
                    "extensions start with a dot, e.g. \".tsx\"",
                );
            }
        }
    }
}
