//! Text range edits on file content.

use super::{FileStore, FsError};

impl FileStore {
    /// Replace every occurrence of `old` in a file. Returns how many were replaced.
    pub fn str_replace(&mut self, raw: &str, old: &str, new: &str) -> Result<usize, FsError> {
        let (path, content) = self.file_content(raw)?;
        let count = if old.is_empty() {
            0
        } else {
            content.matches(old).count()
        };
        if count == 0 {
            return Err(FsError::NoMatch(path));
        }

        let updated = content.replace(old, new);
        self.write(&path, &updated)?;
        Ok(count)
    }

    /// Insert `text` after line `line` (`0` inserts at the top).
    pub fn insert(&mut self, raw: &str, line: usize, text: &str) -> Result<(), FsError> {
        let (path, content) = self.file_content(raw)?;

        let trailing_newline = content.ends_with('\n');
        let mut lines: Vec<&str> = if content.is_empty() {
            Vec::new()
        } else {
            content.split('\n').collect()
        };
        if trailing_newline {
            lines.pop();
        }

        let len = lines.len();
        if line > len {
            return Err(FsError::LineOutOfRange { path, line, len });
        }

        let inserted = text.strip_suffix('\n').unwrap_or(text).split('\n');
        lines.splice(line..line, inserted);

        let mut updated = lines.join("\n");
        if trailing_newline {
            updated.push('\n');
        }
        self.write(&path, &updated)
    }

    /// Normalized path and owned content of a file.
    fn file_content(&self, raw: &str) -> Result<(String, String), FsError> {
        let node = self.read(raw)?;
        match node.content() {
            Some(content) => Ok((node.path().to_string(), content.to_string())),
            None => Err(FsError::IsDirectory(node.path().to_string())),
        }
    }
}
