//! Common utilities shared across CLI commands.

use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::vfs::{FileStore, flat_from_json, flat_to_json};

/// Load a flat project file (`-` reads stdin) into a store.
pub fn load_project(path: &Path) -> Result<FileStore> {
    let json = read_input(path)?;
    let flat = flat_from_json(&json).with_context(|| format!("{} is not a flat project file", path.display()))?;
    FileStore::from_flat(&flat).with_context(|| format!("invalid project layout in {}", path.display()))
}

/// Write the store back as a flat project file.
pub fn save_project(path: &Path, store: &FileStore) -> Result<()> {
    let json = flat_to_json(&store.export_flat())?;
    std::fs::write(path, json + "\n").with_context(|| format!("Failed to write {}", path.display()))
}

/// Read a file, or stdin when `path` is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write to a file, or stdout when no path is given.
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut out = io::stdout().lock();
            out.write_all(content.as_bytes())?;
            out.flush()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.json");
        std::fs::write(&path, r#"{"/App.jsx": "export default () => null;", "/assets": null}"#).unwrap();

        let mut store = load_project(&path).unwrap();
        store.create_file("/lib/util.js", "export const x = 1;").unwrap();
        save_project(&path, &store).unwrap();

        let reloaded = load_project(&path).unwrap();
        assert!(reloaded.read("/assets").unwrap().is_dir());
        assert_eq!(reloaded.export_flat(), store.export_flat());
    }

    #[test]
    fn test_invalid_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.json");
        std::fs::write(&path, r#"["not", "a", "map"]"#).unwrap();
        let err = load_project(&path).unwrap_err();
        assert!(err.to_string().contains("not a flat project file"));
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.html");
        write_output(Some(&path), "<html></html>").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
