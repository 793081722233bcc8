//! Embedded page templates and scripts.
//!
//! # Module Structure
//!
//! - `template` - Template types for typed variable injection
//! - `preview` - The sandboxed preview document and its runtime module
//! - `serve` - Dev server host page
//!
//! Every value injected here must already be escaped for its context;
//! the vars types only place text.

mod template;

pub use template::{Template, TemplateVars, substitute};

pub mod preview {
    use super::{Template, TemplateVars, substitute};

    /// Runtime module: error boundary, mount, ready signal.
    pub const RUNTIME_JS: &str = include_str!("preview/runtime.js");

    /// Variables for document.html.
    pub struct DocumentVars<'a> {
        /// HTML-escaped title.
        pub title: &'a str,
        /// JSON object `{generation, entry}`, script-escaped.
        pub boot: &'a str,
        /// Import map JSON, script-escaped.
        pub import_map: &'a str,
        /// `<style>` / `<link>` tags.
        pub styles: &'a str,
    }

    impl TemplateVars for DocumentVars<'_> {
        fn apply(&self, content: &str) -> String {
            substitute(
                content,
                &[
                    ("__KILN_RUNTIME__", RUNTIME_JS),
                    ("__KILN_BOOT__", self.boot),
                    ("__KILN_TITLE__", self.title),
                    ("__KILN_IMPORT_MAP__", self.import_map),
                    ("__KILN_STYLES__", self.styles),
                ],
            )
        }
    }

    /// Sandboxed preview document.
    pub const DOCUMENT_HTML: Template<DocumentVars<'static>> =
        Template::new(include_str!("preview/document.html"));
}

pub mod serve {
    use super::{Template, TemplateVars, substitute};

    /// Variables for host.html.
    pub struct HostVars<'a> {
        /// HTML-escaped title.
        pub title: &'a str,
        /// Initial message (`render` / `error`) as JSON, or `null`.
        pub initial: &'a str,
        /// Live reload port, `None` when watching is off.
        pub ws_port: Option<u16>,
    }

    impl TemplateVars for HostVars<'_> {
        fn apply(&self, content: &str) -> String {
            let port = self.ws_port.map_or_else(|| "null".to_string(), |p| p.to_string());
            substitute(
                content,
                &[
                    ("__KILN_WS_PORT__", port.as_str()),
                    ("__KILN_TITLE__", self.title),
                    ("__KILN_INITIAL__", self.initial),
                ],
            )
        }
    }

    /// Host page: toolbar, problems panel and the sandboxed frame.
    pub const HOST_HTML: Template<HostVars<'static>> = Template::new(include_str!("serve/host.html"));
}
