//! Virtual path utilities.
//!
//! Pure functions over `/`-separated store keys. No side effects.
//!
//! Invariants of a normalized path:
//! - Starts with exactly one `/`
//! - No empty, `.` or `..` segments
//! - No trailing `/` (except the root itself)

use super::FsError;

/// The project root.
pub const ROOT: &str = "/";

/// Normalize a raw path into a store key.
///
/// Collapses repeated separators, resolves `.` and `..`, and adds the
/// leading separator. Paths escaping the root, blank segments and NUL bytes
/// are rejected.
///
/// # Example
/// ```ignore
/// assert_eq!(normalize("components//Button.jsx")?, "/components/Button.jsx");
/// ```
pub fn normalize(raw: &str) -> Result<String, FsError> {
    if raw.contains('\0') {
        return Err(FsError::InvalidPath(raw.to_string(), "contains a NUL byte"));
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(FsError::InvalidPath(raw.to_string(), "path is empty"));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in trimmed.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(FsError::InvalidPath(raw.to_string(), "escapes the project root"));
                }
            }
            s if s.trim().is_empty() => {
                return Err(FsError::InvalidPath(raw.to_string(), "contains a blank segment"));
            }
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Ok(ROOT.to_string());
    }
    Ok(format!("/{}", segments.join("/")))
}

/// Parent directory of a normalized path (`None` for the root).
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Last segment of a normalized path (empty for the root).
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

/// Join a normalized directory and a single segment.
pub fn join(dir: &str, name: &str) -> String {
    if dir == ROOT {
        format!("/{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Whether `path` equals `ancestor` or lives below it.
pub fn is_within(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return true;
    }
    path == ancestor
        || (path.starts_with(ancestor) && path.as_bytes().get(ancestor.len()) == Some(&b'/'))
}

/// Extension of the last segment, without the dot (`None` for dotfiles).
pub fn extension(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&name[idx + 1..]),
    }
}

/// Path with the extension of its last segment removed.
pub fn strip_extension(path: &str) -> &str {
    match extension(path) {
        Some(ext) => &path[..path.len() - ext.len() - 1],
        None => path,
    }
}

/// Ancestors of a normalized path, nearest first, root last.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    std::iter::successors(parent(path), |&p| parent(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_separators() {
        assert_eq!(normalize("components//Button.jsx").unwrap(), "/components/Button.jsx");
        assert_eq!(normalize("///a/./b/").unwrap(), "/a/b");
        assert_eq!(normalize("/").unwrap(), "/");
    }

    #[test]
    fn test_normalize_dot_dot() {
        assert_eq!(normalize("/a/b/../c").unwrap(), "/a/c");
        assert!(matches!(normalize("/a/../.."), Err(FsError::InvalidPath(..))));
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert!(normalize("").is_err());
        assert!(normalize("   ").is_err());
        assert!(normalize("/a/ /b").is_err());
        assert!(normalize("/a\0").is_err());
    }

    #[test]
    fn test_parent_and_name() {
        assert_eq!(parent("/"), None);
        assert_eq!(parent("/App.jsx"), Some("/"));
        assert_eq!(parent("/a/b/c.js"), Some("/a/b"));
        assert_eq!(file_name("/a/b/c.js"), "c.js");
        assert_eq!(file_name("/"), "");
    }

    #[test]
    fn test_join_roundtrip() {
        for path in ["/App.jsx", "/components/ui/Card.tsx"] {
            let dir = parent(path).unwrap();
            assert_eq!(join(dir, file_name(path)), path);
        }
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("/a/b", "/a"));
        assert!(is_within("/a", "/a"));
        assert!(!is_within("/ab", "/a"));
        assert!(is_within("/anything", "/"));
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("/a/Counter.jsx"), Some("jsx"));
        assert_eq!(extension("/a/.env"), None);
        assert_eq!(extension("/a/Makefile"), None);
        assert_eq!(strip_extension("/a/Counter.jsx"), "/a/Counter");
        assert_eq!(strip_extension("/a/Counter"), "/a/Counter");
    }

    #[test]
    fn test_ancestors() {
        let all: Vec<_> = ancestors("/a/b/c.js").collect();
        assert_eq!(all, vec!["/a/b", "/a", "/"]);
    }
}
