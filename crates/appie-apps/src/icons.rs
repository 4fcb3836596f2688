//! Icon theme lookups across XDG data directories.
//!
//! A lookup walks, in order: the requested theme in every data dir, the
//! `hicolor` fallback theme in every data dir, then the `pixmaps` dirs.
//! Within one theme directory it tries the exact size, then the closest
//! available size, then inherited themes, then scalable icons.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::debug;

use crate::paths::{DataDirs, list_dir, parse_theme_inherits};

/// Supported image extensions, in preference order.
const ICON_EXTENSIONS: [&str; 3] = ["png", "svg", "xpm"];

/// Purpose directories searched when the exact size is missing.
const PURPOSE_DIRS: [&str; 8] = [
    "apps",
    "actions",
    "devices",
    "emblems",
    "legacy",
    "mimetypes",
    "places",
    "status",
];

/// Theme every lookup falls back to.
pub const FALLBACK_THEME: &str = "hicolor";

/// How a theme names its size directories.
#[derive(Clone, Copy, Debug)]
enum SizeNaming {
    /// "32x32"
    Square,
    /// "32"
    Plain,
}

impl SizeNaming {
    fn parse(self, name: &str) -> Option<u32> {
        match self {
            SizeNaming::Square => name.split('x').next()?.parse().ok(),
            SizeNaming::Plain => name.parse().ok(),
        }
    }

    fn dir_name(self, size: u32) -> String {
        match self {
            SizeNaming::Square => format!("{size}x{size}"),
            SizeNaming::Plain => size.to_string(),
        }
    }
}

/// Resolves icon names to files using the icon themes found under a set of
/// data directories.
#[derive(Clone, Debug)]
pub struct IconResolver {
    data_dirs: DataDirs,
}

impl IconResolver {
    pub fn new(data_dirs: DataDirs) -> Self {
        Self { data_dirs }
    }

    pub fn data_dirs(&self) -> &DataDirs {
        &self.data_dirs
    }

    /// Find the file for `icon_name` at roughly `size` pixels in `theme`.
    /// Returns `None` when no theme, fallback or pixmap has it.
    ///
    /// Absolute names are never resolved, since joining them would escape
    /// every theme root.
    pub fn lookup(&self, theme: &str, size: u32, icon_name: &str) -> Option<PathBuf> {
        if icon_name.is_empty() || Path::new(icon_name).is_absolute() {
            return None;
        }

        let mut themes = vec![theme];
        if theme != FALLBACK_THEME {
            themes.push(FALLBACK_THEME);
        }

        for theme in themes {
            for data_dir in self.data_dirs.iter() {
                let theme_dir = data_dir.join("icons").join(theme);
                if let Some(path) = self.lookup_in_theme(&theme_dir, data_dir, size, icon_name) {
                    return Some(path);
                }
            }
        }

        for data_dir in self.data_dirs.iter() {
            if let Some(path) = find_with_extensions(&data_dir.join("pixmaps"), icon_name) {
                return Some(path);
            }
        }

        debug!("No icon found for {} ({}px, theme {})", icon_name, size, theme);
        None
    }

    /// Search a single theme directory, following its inherited themes
    /// under `data_dir`.
    pub fn lookup_in_theme(
        &self,
        theme_dir: &Path,
        data_dir: &Path,
        size: u32,
        icon_name: &str,
    ) -> Option<PathBuf> {
        let mut visited = HashSet::new();
        find_in_theme(theme_dir, data_dir, size, icon_name, &mut visited)
    }

    /// Names of all icon theme directories, in data dir order.
    pub fn available_themes(&self) -> Vec<String> {
        let mut themes = Vec::new();
        for data_dir in self.data_dirs.iter() {
            for entry in list_dir(&data_dir.join("icons")) {
                let name = entry.file_name().to_string_lossy();
                if name.starts_with('.') || !entry.file_type().is_dir() {
                    continue;
                }
                themes.push(name.to_string());
            }
        }
        themes
    }
}

fn find_in_theme(
    theme_dir: &Path,
    data_dir: &Path,
    size: u32,
    icon_name: &str,
    visited: &mut HashSet<PathBuf>,
) -> Option<PathBuf> {
    if !visited.insert(theme_dir.to_path_buf()) {
        debug!("Theme {} already searched, skipping", theme_dir.display());
        return None;
    }
    if !theme_dir.is_dir() {
        return None;
    }

    let size_dir = size.to_string();
    let square_dir = SizeNaming::Square.dir_name(size);
    for ext in ICON_EXTENSIONS {
        let file = format!("{icon_name}.{ext}");
        let candidates = [
            // <theme>/32/apps/xterm.png
            theme_dir.join(&size_dir).join("apps").join(&file),
            // <theme>/32x32/apps/xterm.png
            theme_dir.join(&square_dir).join("apps").join(&file),
            // <theme>/apps/32/xterm.png
            theme_dir.join("apps").join(&size_dir).join(&file),
            // <theme>/apps/32x32/xterm.png
            theme_dir.join("apps").join(&square_dir).join(&file),
        ];
        if let Some(found) = candidates.into_iter().find(|c| c.is_file()) {
            return Some(found);
        }
    }

    for joiner in PURPOSE_DIRS {
        if let Some(found) = lookup_any_size(theme_dir, joiner, icon_name, size) {
            return Some(found);
        }
    }

    for parent in parse_theme_inherits(theme_dir) {
        let parent_dir = data_dir.join("icons").join(&parent);
        if let Some(found) = find_in_theme(&parent_dir, data_dir, size, icon_name, visited) {
            return Some(found);
        }
    }

    for ext in ICON_EXTENSIONS {
        let file = format!("{icon_name}.{ext}");
        let candidates = [
            theme_dir.join("scalable").join("apps").join(&file),
            theme_dir.join("apps").join("scalable").join(&file),
        ];
        if let Some(found) = candidates.into_iter().find(|c| c.is_file()) {
            return Some(found);
        }
    }

    None
}

/// Closest size match for one purpose dir, trying `<theme>/<size>/<joiner>`
/// before `<theme>/<joiner>/<size>`.
fn lookup_any_size(theme_dir: &Path, joiner: &str, icon_name: &str, size: u32) -> Option<PathBuf> {
    let entries = list_dir(theme_dir);
    let found = closest_size_icon(&entries, size, SizeNaming::Square, theme_dir, Some(joiner), icon_name)
        .or_else(|| closest_size_icon(&entries, size, SizeNaming::Plain, theme_dir, Some(joiner), icon_name));
    if found.is_some() {
        return found;
    }

    let purpose_dir = theme_dir.join(joiner);
    let entries = list_dir(&purpose_dir);
    closest_size_icon(&entries, size, SizeNaming::Square, &purpose_dir, None, icon_name)
        .or_else(|| closest_size_icon(&entries, size, SizeNaming::Plain, &purpose_dir, None, icon_name))
}

/// Pick the size directory nearest to `size` that actually holds the icon.
/// Ties keep the first directory in name order.
fn closest_size_icon(
    entries: &[walkdir::DirEntry],
    size: u32,
    naming: SizeNaming,
    base_dir: &Path,
    joiner: Option<&str>,
    icon_name: &str,
) -> Option<PathBuf> {
    let mut best: Option<(u32, PathBuf)> = None;

    for entry in entries {
        let Some(candidate) = naming.parse(&entry.file_name().to_string_lossy()) else {
            continue;
        };

        let mut dir = base_dir.join(naming.dir_name(candidate));
        if let Some(joiner) = joiner {
            dir.push(joiner);
        }
        let Some(found) = find_with_extensions(&dir, icon_name) else {
            continue;
        };

        let diff = size.abs_diff(candidate);
        match &best {
            Some((best_diff, _)) if diff >= *best_diff => {}
            _ => best = Some((diff, found)),
        }
    }

    best.map(|(_, path)| path)
}

fn find_with_extensions(dir: &Path, icon_name: &str) -> Option<PathBuf> {
    ICON_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{icon_name}.{ext}")))
        .find(|p| p.is_file())
}
