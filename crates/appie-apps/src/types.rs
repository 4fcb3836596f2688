//! Core types for appie-apps

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{AppError, Result};

/// Where the source code of an application lives, if its metadata says so.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AppSource {
    pub repo: String,
    pub dir: String,
}

/// An icon ready to hand to a renderer: a file name and its raw bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconResource {
    pub name: String,
    pub content: Vec<u8>,
}

impl IconResource {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Read an image file as-is. The resource is named after the file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self { name, content })
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_names_resource_after_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("xterm.png");
        fs::write(&path, b"png-bytes").unwrap();

        let icon = IconResource::load(&path).unwrap();
        assert_eq!(icon.name, "xterm.png");
        assert_eq!(icon.content, b"png-bytes");
        assert!(!icon.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = IconResource::load(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }
}
