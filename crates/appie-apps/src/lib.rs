//! appie-apps: Application discovery and icon lookup for desktop hosts.
//!
//! Provides a unified service for:
//! - Listing installed apps from FreeDesktop.org .desktop files or macOS bundles
//! - Icon theme lookup with size matching and theme inheritance
//! - Name lookups, search, default apps and category grouping
//! - Lazy caching of one scan per provider, with explicit invalidation

mod cache;
mod desktop_entry;
mod error;
mod fdo;
mod icons;
mod launch;
mod macos;
mod paths;
mod provider;
mod types;

pub use desktop_entry::{DesktopEntry, extract_args, parse_desktop_file};
pub use error::{AppError, Result};
pub use fdo::{FALLBACK_CATEGORY, FdoApp, FdoProvider, SUPPORTED_CATEGORIES};
pub use icons::{FALLBACK_THEME, IconResolver};
pub use launch::command_line;
pub use macos::{MacApp, MacOsProvider, load_app_bundle};
pub use paths::DataDirs;
pub use provider::{
    App, AppData, Platform, Provider, find_one_app_from_names, provider_for, system_provider,
};
pub use types::{AppSource, IconResource};

use std::sync::{Arc, OnceLock};

static PROVIDER: OnceLock<Option<Arc<dyn Provider>>> = OnceLock::new();

/// Get the global provider for this system, or None on unsupported platforms.
pub fn get_provider() -> Option<Arc<dyn Provider>> {
    PROVIDER
        .get_or_init(|| system_provider().map(Arc::from))
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(target_os = "linux")]
    #[test]
    fn test_get_provider_is_shared() {
        let first = get_provider().unwrap();
        let second = get_provider().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
