//! Messages posted by the sandboxed frame to its host.
//!
//! ```json
//! {"source":"kiln","type":"ready","generation":4}
//! {"source":"kiln","type":"error","generation":4,"kind":"boundary","message":"boom","stack":"..."}
//! ```

use serde::{Deserialize, Serialize};

use crate::core::RenderGeneration;

/// Which capture path saw a runtime error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Caught by the error boundary while rendering.
    Boundary,
    /// `window` error event (module evaluation, event handlers).
    Uncaught,
    /// Unhandled promise rejection.
    Rejection,
}

impl ErrorKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boundary => "boundary",
            Self::Uncaught => "uncaught",
            Self::Rejection => "rejection",
        }
    }
}

/// Structured report from the sandbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SandboxReport {
    /// The document mounted (after the first commit, or after the entry
    /// failed to load).
    Ready { generation: RenderGeneration },
    Error {
        generation: RenderGeneration,
        kind: ErrorKind,
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stack: Option<String>,
    },
}

impl SandboxReport {
    #[inline]
    pub fn generation(&self) -> RenderGeneration {
        match self {
            Self::Ready { generation } | Self::Error { generation, .. } => *generation,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"ready","generation":0}"#.to_string())
    }

    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
