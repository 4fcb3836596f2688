//! FreeDesktop.org application provider.
//!
//! Apps come from `<data dir>/applications/*.desktop`; icons are resolved
//! through the icon themes under the same data dirs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use log::{info, warn};

use crate::cache::{AppCache, Named};
use crate::desktop_entry::{DesktopEntry, parse_desktop_file};
use crate::error::Result;
use crate::icons::IconResolver;
use crate::launch;
use crate::paths::{DataDirs, list_dir};
use crate::provider::{App, AppData, Provider, find_one_app_from_names};
use crate::types::{AppSource, IconResource};

/// Group for apps without a supported category.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Main categories from the desktop menu specification.
pub const SUPPORTED_CATEGORIES: [&str; 11] = [
    "AudioVideo",
    "Development",
    "Education",
    "Game",
    "Graphics",
    "Network",
    "Office",
    "Science",
    "Settings",
    "System",
    "Utility",
];

const DEFAULT_TERMINALS: [&str; 5] = [
    "fyneterm",
    "xfce4-terminal",
    "gnome-terminal",
    "org.kde.konsole",
    "xterm",
];
const DEFAULT_BROWSERS: [&str; 3] = ["chromium", "google-chrome", "firefox"];
const DEFAULT_MAIL: [&str; 3] = ["sylpheed", "thunderbird", "evolution"];
const DEFAULT_GRAPHICS: &str = "gimp";

/// An application described by a .desktop file.
pub struct FdoApp {
    entry: DesktopEntry,
    resolver: Arc<IconResolver>,
    icon_cache: OnceLock<IconResource>,
}

impl FdoApp {
    pub fn new(entry: DesktopEntry, resolver: Arc<IconResolver>) -> Self {
        Self {
            entry,
            resolver,
            icon_cache: OnceLock::new(),
        }
    }

    /// Raw `Exec` command, field codes included.
    pub fn exec(&self) -> &str {
        &self.entry.exec
    }

    /// First declared category that is a supported main category, or
    /// "Other".
    pub fn main_category(&self) -> &str {
        self.entry
            .categories
            .iter()
            .map(String::as_str)
            .find(|cat| SUPPORTED_CATEGORIES.contains(cat))
            .unwrap_or(FALLBACK_CATEGORY)
    }

    /// Icon file for this app: the path given in the entry, or a theme lookup.
    pub fn icon_path(&self, theme: &str, size: u32) -> Option<PathBuf> {
        if let Some(path) = &self.entry.icon_path {
            return Some(path.clone());
        }
        self.resolver.lookup(theme, size, &self.entry.icon_name)
    }
}

impl Named for FdoApp {
    fn display_name(&self) -> &str {
        &self.entry.name
    }
}

impl AppData for FdoApp {
    fn name(&self) -> &str {
        &self.entry.name
    }

    fn categories(&self) -> &[String] {
        &self.entry.categories
    }

    fn hidden(&self) -> bool {
        self.entry.no_display
    }

    fn icon(&self, theme: &str, size: u32) -> Option<&IconResource> {
        if let Some(icon) = self.icon_cache.get() {
            return Some(icon);
        }

        let path = self.icon_path(theme, size)?;
        match IconResource::load(&path) {
            Ok(icon) => Some(self.icon_cache.get_or_init(|| icon)),
            Err(e) => {
                warn!("Failed to load image: {}", e);
                None
            }
        }
    }

    fn mime_types(&self) -> &[String] {
        &self.entry.mime_types
    }

    fn source(&self) -> Option<&AppSource> {
        self.entry.source.as_ref()
    }

    fn run_with_parameters(&self, params: &[String], env: &[(String, String)]) -> Result<()> {
        let (program, args) = launch::command_line(&self.entry.exec, params)?;
        launch::spawn(&program, &args, env)?;
        Ok(())
    }
}

/// Provider following the FreeDesktop.org desktop entry and icon theme
/// specifications.
pub struct FdoProvider {
    resolver: Arc<IconResolver>,
    cache: AppCache<FdoApp>,
}

impl FdoProvider {
    pub fn new(data_dirs: DataDirs) -> Self {
        let resolver = Arc::new(IconResolver::new(data_dirs));
        let scan_resolver = resolver.clone();

        Self {
            resolver,
            cache: AppCache::new(move || scan_applications(&scan_resolver)),
        }
    }

    /// Provider over the data dirs named by `XDG_DATA_DIRS`.
    pub fn from_env() -> Self {
        Self::new(DataDirs::from_env())
    }

    pub fn resolver(&self) -> &IconResolver {
        &self.resolver
    }

    /// Look up an app by display name, falling back to the contents of the
    /// desktop entries.
    pub fn lookup_application(&self, app_name: &str) -> Option<Arc<FdoApp>> {
        if app_name.is_empty() {
            return None;
        }

        let mut found = None;
        self.cache.for_each(|name, app| {
            if name == app_name {
                found = Some(app.clone());
                return true;
            }
            false
        });

        found.or_else(|| self.lookup_application_by_metadata(app_name))
    }

    /// Match the requested name against the name or command of each entry.
    fn lookup_application_by_metadata(&self, app_name: &str) -> Option<Arc<FdoApp>> {
        let mut found = None;
        self.cache.for_each(|_, app| {
            if app.entry.name == app_name || app.entry.exec == app_name {
                found = Some(app.clone());
                return true;
            }
            false
        });
        found
    }
}

impl Default for FdoProvider {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Parse every .desktop file in the application dirs, skipping the ones
/// that cannot be read.
fn scan_applications(resolver: &Arc<IconResolver>) -> Vec<Arc<FdoApp>> {
    info!("Scanning desktop entries...");
    let mut apps = Vec::new();

    for dir in resolver.data_dirs().application_dirs() {
        for file in list_dir(&dir) {
            let name = file.file_name().to_string_lossy();
            if name.starts_with('.') || file.file_type().is_dir() || !name.ends_with(".desktop") {
                continue;
            }

            match parse_desktop_file(file.path()) {
                Ok(entry) => apps.push(Arc::new(FdoApp::new(entry, resolver.clone()))),
                Err(e) => warn!("Skipping desktop entry: {}", e),
            }
        }
    }

    info!("Found {} desktop applications.", apps.len());
    apps
}

impl Provider for FdoProvider {
    fn available_apps(&self) -> Vec<App> {
        self.cache
            .apps()
            .iter()
            .map(|app| app.clone() as App)
            .collect()
    }

    fn available_themes(&self) -> Vec<String> {
        self.resolver.available_themes()
    }

    fn find_app_from_name(&self, name: &str) -> Option<App> {
        self.lookup_application(name).map(|app| app as App)
    }

    fn find_apps_matching(&self, pattern: &str) -> Vec<App> {
        let pattern = pattern.to_lowercase();
        let mut matches: Vec<App> = Vec::new();

        self.cache.for_each(|_, app| {
            if app.entry.name.to_lowercase().contains(&pattern)
                || app.entry.exec.to_lowercase().contains(&pattern)
            {
                matches.push(app.clone());
            }
            false
        });

        matches
    }

    fn default_apps(&self) -> Vec<App> {
        [
            find_one_app_from_names(self, &DEFAULT_TERMINALS),
            find_one_app_from_names(self, &DEFAULT_BROWSERS),
            find_one_app_from_names(self, &DEFAULT_MAIL),
            self.find_app_from_name(DEFAULT_GRAPHICS),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn categorized_apps(&self) -> HashMap<String, Vec<App>> {
        let mut categories: HashMap<String, Vec<App>> = HashMap::new();

        self.cache.for_each(|_, app| {
            categories
                .entry(app.main_category().to_string())
                .or_default()
                .push(app.clone());
            false
        });

        categories
    }

    fn invalidate(&self) {
        self.cache.invalidate();
    }
}
