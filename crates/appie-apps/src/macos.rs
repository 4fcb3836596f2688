//! macOS application bundle provider.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use log::{info, warn};
use serde::Deserialize;

use crate::cache::{AppCache, Named};
use crate::error::{AppError, Result};
use crate::launch;
use crate::paths::list_dir;
use crate::provider::{App, AppData, Provider, find_one_app_from_names};
use crate::types::{AppSource, IconResource};

/// Directories scanned for `.app` bundles.
pub const DEFAULT_ROOTS: [&str; 4] = [
    "/Applications",
    "/Applications/Utilities",
    "/System/Applications",
    "/System/Applications/Utilities",
];

const APPLICATIONS_CATEGORY: &str = "Applications";
const UTILITIES_CATEGORY: &str = "Utilities";

/// The Info.plist keys we read.
#[derive(Debug, Default, Deserialize)]
struct InfoPlist {
    #[serde(rename = "CFBundleDisplayName")]
    display_name: Option<String>,
    #[serde(rename = "CFBundleExecutable")]
    executable: Option<String>,
    #[serde(rename = "CFBundleIconFile")]
    icon_file: Option<String>,
}

/// An application bundle such as `/Applications/Safari.app`.
pub struct MacApp {
    name: String,
    executable: String,
    categories: Vec<String>,
    run_path: PathBuf,
    icon_path: Option<PathBuf>,
    icon_cache: OnceLock<IconResource>,
}

impl MacApp {
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Path of the bundle's `.icns` file, if it declares one.
    pub fn icon_path(&self) -> Option<&Path> {
        self.icon_path.as_deref()
    }
}

impl Named for MacApp {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl AppData for MacApp {
    fn name(&self) -> &str {
        &self.name
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn hidden(&self) -> bool {
        false
    }

    fn icon(&self, _theme: &str, _size: u32) -> Option<&IconResource> {
        if let Some(icon) = self.icon_cache.get() {
            return Some(icon);
        }

        let path = self.icon_path.as_deref()?;
        match decode_icns(path) {
            Ok(icon) => Some(self.icon_cache.get_or_init(|| icon)),
            Err(e) => {
                warn!("{}", e);
                None
            }
        }
    }

    fn mime_types(&self) -> &[String] {
        // Bundles declare document types as UTIs, not MIME types.
        &[]
    }

    fn source(&self) -> Option<&AppSource> {
        None
    }

    fn run_with_parameters(&self, params: &[String], env: &[(String, String)]) -> Result<()> {
        // `open` takes a single document to hand to the app.
        let mut args = vec!["-a".to_string(), self.run_path.to_string_lossy().to_string()];
        args.extend(params.first().cloned());

        launch::spawn("open", &args, env)?;
        Ok(())
    }
}

/// Read a bundle's Info.plist. `name` is the bundle directory name without
/// `.app`, used when the plist has no display name.
pub fn load_app_bundle(name: &str, path: &Path, category: &str) -> Result<MacApp> {
    let plist_path = path.join("Contents").join("Info.plist");
    let info: InfoPlist = plist::from_file(&plist_path).map_err(|source| AppError::Plist {
        path: plist_path.clone(),
        source,
    })?;

    let executable = info.executable.unwrap_or_default();
    let icon_path = info.icon_file.filter(|f| !f.is_empty()).map(|file| {
        let mut icon = path.join("Contents").join("Resources").join(file);
        if icon.extension().is_none_or(|ext| ext != "icns") {
            icon.as_mut_os_string().push(".icns");
        }
        icon
    });

    Ok(MacApp {
        name: info
            .display_name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| name.to_string()),
        run_path: path.join("Contents").join("MacOS").join(&executable),
        executable,
        categories: vec![category.to_string()],
        icon_path,
        icon_cache: OnceLock::new(),
    })
}

/// Decode the largest image of an ICNS file and re-encode it as PNG.
fn decode_icns(path: &Path) -> Result<IconResource> {
    let icon_error = |source: io::Error| AppError::Icon {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let family = icns::IconFamily::read(BufReader::new(file)).map_err(icon_error)?;

    let mut types = family.available_icons();
    types.sort_by_key(|t| std::cmp::Reverse(t.pixel_width()));

    // Some large entries are JPEG 2000, which cannot be decoded; fall back
    // to the next size down.
    let image = types
        .into_iter()
        .find_map(|t| family.get_icon_with_type(t).ok())
        .ok_or_else(|| {
            icon_error(io::Error::new(
                io::ErrorKind::InvalidData,
                "no decodable image in icon family",
            ))
        })?;

    let mut data = Vec::new();
    image.write_png(&mut data).map_err(icon_error)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().replacen(".icns", ".png", 1))
        .unwrap_or_default();
    Ok(IconResource::new(name, data))
}

/// Provider for application bundles on macOS.
pub struct MacOsProvider {
    cache: AppCache<MacApp>,
}

impl MacOsProvider {
    pub fn new() -> Self {
        Self::with_roots(DEFAULT_ROOTS.iter().map(PathBuf::from).collect())
    }

    /// Provider scanning the given directories instead of the system ones.
    pub fn with_roots(roots: Vec<PathBuf>) -> Self {
        Self {
            cache: AppCache::new(move || scan_bundles(&roots)),
        }
    }
}

impl Default for MacOsProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn scan_bundles(roots: &[PathBuf]) -> Vec<Arc<MacApp>> {
    info!("Scanning application bundles...");
    let mut apps = Vec::new();

    for root in roots {
        if !root.is_dir() {
            warn!("Could not read applications directory {}", root.display());
            continue;
        }
        let category = root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        for entry in list_dir(root) {
            let file_name = entry.file_name().to_string_lossy();
            let Some(name) = file_name.strip_suffix(".app") else {
                continue;
            };
            if !entry.file_type().is_dir() {
                continue;
            }

            match load_app_bundle(name, entry.path(), &category) {
                Ok(app) => apps.push(Arc::new(app)),
                Err(e) => warn!("Skipping application bundle: {}", e),
            }
        }
    }

    info!("Found {} application bundles.", apps.len());
    apps
}

impl Provider for MacOsProvider {
    fn available_apps(&self) -> Vec<App> {
        self.cache
            .apps()
            .iter()
            .map(|app| app.clone() as App)
            .collect()
    }

    fn available_themes(&self) -> Vec<String> {
        Vec::new()
    }

    fn find_app_from_name(&self, app_name: &str) -> Option<App> {
        let mut found: Option<App> = None;
        self.cache.for_each(|name, app| {
            if name == app_name {
                found = Some(app.clone());
                return true;
            }
            false
        });
        found
    }

    fn find_apps_matching(&self, pattern: &str) -> Vec<App> {
        let pattern = pattern.to_lowercase();
        let mut matches: Vec<App> = Vec::new();

        self.cache.for_each(|name, app| {
            if name.to_lowercase().contains(&pattern) {
                matches.push(app.clone());
            }
            false
        });

        matches
    }

    fn default_apps(&self) -> Vec<App> {
        [
            find_one_app_from_names(self, &["Terminal", "iTerm"]),
            find_one_app_from_names(self, &["Google Chrome", "Firefox", "Safari"]),
            find_one_app_from_names(self, &["Spark", "AirMail", "Mail"]),
            self.find_app_from_name("Photos"),
            self.find_app_from_name("System Preferences"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn categorized_apps(&self) -> HashMap<String, Vec<App>> {
        let mut apps: Vec<App> = Vec::new();
        let mut utils: Vec<App> = Vec::new();

        self.cache.for_each(|_, app| {
            if app.categories.first().map(String::as_str) == Some(APPLICATIONS_CATEGORY) {
                apps.push(app.clone());
            } else {
                utils.push(app.clone());
            }
            false
        });

        HashMap::from([
            (APPLICATIONS_CATEGORY.to_string(), apps),
            (UTILITIES_CATEGORY.to_string(), utils),
        ])
    }

    fn invalidate(&self) {
        self.cache.invalidate();
    }
}
