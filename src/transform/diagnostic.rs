//! Structured syntax diagnostics.

use std::fmt;

use oxc::diagnostics::OxcDiagnostic;
use serde::Serialize;

/// A non-recoverable syntax error in one source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyntaxDiagnostic {
    pub path: String,
    pub message: String,
    /// 1-based.
    pub line: usize,
    /// 1-based, counted in characters.
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl SyntaxDiagnostic {
    /// Diagnostic at a byte offset of `source`.
    pub fn at_offset(path: &str, source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(source, offset);
        Self {
            path: path.to_string(),
            message: message.into(),
            line,
            column,
            help: None,
        }
    }

    /// Convert the first oxc error, locating it by its first label.
    pub fn from_oxc(path: &str, source: &str, error: &OxcDiagnostic) -> Self {
        let offset = error
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map_or(0, |label| label.offset());

        let mut message = error.to_string();
        if message.trim().is_empty() {
            message = "syntax error".to_string();
        }

        Self {
            help: error.help.as_ref().map(|help| help.to_string()),
            ..Self::at_offset(path, source, offset, message)
        }
    }
}

impl fmt::Display for SyntaxDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}: {}", self.path, self.line, self.column, self.message)?;
        if let Some(help) = &self.help {
            write!(f, " (help: {help})")?;
        }
        Ok(())
    }
}

impl std::error::Error for SyntaxDiagnostic {}

/// 1-based line and column of a byte offset. Offsets past the end clamp to
/// the last position.
pub fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut end = offset.min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
