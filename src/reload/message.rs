//! Live reload message protocol.
//!
//! JSON messages pushed from the dev server to the host page.
//!
//! # Message Types
//!
//! - `connected`: sent once per connection
//! - `render`: a new generation committed; mount a fresh frame at `url`
//! - `error`: the latest pass failed; keep the current frame, show why

use serde::{Deserialize, Serialize};

use crate::core::RenderGeneration;
use crate::preview::PreviewError;

/// Live reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// A preview document is ready
    Render {
        generation: RenderGeneration,
        /// Where the host loads the document from
        url: String,
    },

    /// Render failure (problems panel, no remount)
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        column: Option<usize>,
    },
}

impl ReloadMessage {
    /// Create a connected message
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Create a render message
    pub fn render(generation: RenderGeneration, url: impl Into<String>) -> Self {
        Self::Render {
            generation,
            url: url.into(),
        }
    }

    /// Describe a failed pass. Stale passes are never shown.
    pub fn from_failure(error: &PreviewError) -> Option<Self> {
        match error {
            PreviewError::Stale { .. } => None,
            PreviewError::Syntax { diagnostic } => Some(Self::Error {
                message: diagnostic.message.clone(),
                path: Some(diagnostic.path.clone()),
                line: Some(diagnostic.line),
                column: Some(diagnostic.column),
            }),
            PreviewError::MissingEntry { path } => Some(Self::Error {
                message: error.to_string(),
                path: Some(path.clone()),
                line: None,
                column: None,
            }),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"error","message":"serialization failed"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
