//! Path helpers for XDG data directories and theme metadata.

use std::fs;
use std::path::{Path, PathBuf};

/// Fallback data dirs used when `XDG_DATA_DIRS` is unset or empty.
/// The user's `~/.local/share` goes in front of these.
const SYSTEM_DATA_DIRS: [&str; 2] = ["/usr/local/share", "/usr/share"];

/// The ordered list of XDG data directories every lookup searches.
///
/// Components take this explicitly rather than reading the environment,
/// so tests and callers can point discovery at any tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataDirs {
    dirs: Vec<PathBuf>,
}

impl DataDirs {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Read `XDG_DATA_DIRS` from the process environment.
    pub fn from_env() -> Self {
        let value = std::env::var("XDG_DATA_DIRS").ok();
        Self::from_value(value.as_deref(), dirs::home_dir())
    }

    /// Build from a colon separated list, as found in `XDG_DATA_DIRS`.
    /// Empty segments are ignored; if nothing is left the standard
    /// fallback list is used.
    pub fn from_value(value: Option<&str>, home: Option<PathBuf>) -> Self {
        let dirs: Vec<PathBuf> = value
            .unwrap_or_default()
            .split(':')
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .collect();

        if !dirs.is_empty() {
            return Self { dirs };
        }

        let mut fallback = Vec::new();
        if let Some(home) = home {
            fallback.push(home.join(".local/share"));
        }
        fallback.extend(SYSTEM_DATA_DIRS.iter().map(PathBuf::from));

        Self { dirs: fallback }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.dirs.iter().map(PathBuf::as_path)
    }

    /// Get all application .desktop file directories, in search order.
    pub fn application_dirs(&self) -> Vec<PathBuf> {
        self.iter().map(|d| d.join("applications")).collect()
    }
}

impl Default for DataDirs {
    fn default() -> Self {
        Self::from_env()
    }
}

/// List the immediate children of `dir`, sorted by file name.
/// Unreadable directories yield nothing.
pub(crate) fn list_dir(dir: &Path) -> Vec<walkdir::DirEntry> {
    walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .collect()
}

/// Parent theme names declared by the first `Inherits=` line of a theme's
/// `index.theme`. Missing or unreadable index files have no parents.
pub(crate) fn parse_theme_inherits(theme_root: &Path) -> Vec<String> {
    let Ok(content) = fs::read_to_string(theme_root.join("index.theme")) else {
        return Vec::new();
    };

    content
        .lines()
        .find_map(|line| line.trim().strip_prefix("Inherits="))
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
