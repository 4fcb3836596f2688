use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::fdo::FdoProvider;
use crate::macos::MacOsProvider;
use crate::types::{AppSource, IconResource};

/// Read-only view of one installed application.
/// This provides a unified interface regardless of the host platform.
pub trait AppData: Send + Sync {
    /// Display name of the app.
    fn name(&self) -> &str;

    /// Categories the app declares (platform specific).
    fn categories(&self) -> &[String];

    /// Whether listings should hide this app.
    fn hidden(&self) -> bool;

    /// Icon in the requested theme and size. The first icon loaded is kept
    /// and returned for every later call.
    fn icon(&self, theme: &str, size: u32) -> Option<&IconResource>;

    /// MIME types the app can open.
    fn mime_types(&self) -> &[String];

    /// Location of the app's source code, if its metadata declares one.
    fn source(&self) -> Option<&AppSource>;

    /// Start the app with extra environment variables.
    fn run(&self, env: &[(String, String)]) -> Result<()> {
        self.run_with_parameters(&[], env)
    }

    /// Start the app with command line parameters and extra environment
    /// variables. The variables are applied on top of the current process
    /// environment.
    fn run_with_parameters(&self, params: &[String], env: &[(String, String)]) -> Result<()>;
}

/// Shared handle to an application descriptor.
pub type App = Arc<dyn AppData>;

/// Trait that all platform application sources must implement.
pub trait Provider: Send + Sync {
    /// Every app found on the system, in enumeration order.
    fn available_apps(&self) -> Vec<App>;

    /// Icon themes installed on the system.
    fn available_themes(&self) -> Vec<String>;

    /// Find one app by display name.
    fn find_app_from_name(&self, name: &str) -> Option<App>;

    /// All apps whose name (case-insensitive) contains `pattern`.
    fn find_apps_matching(&self, pattern: &str) -> Vec<App>;

    /// One preferred app per common role, for apps that are installed.
    fn default_apps(&self) -> Vec<App>;

    /// Apps grouped by their main category.
    fn categorized_apps(&self) -> HashMap<String, Vec<App>>;

    /// Drop cached results so the next query scans the system again.
    fn invalidate(&self);
}

/// Return the first app found, trying `names` in order.
pub fn find_one_app_from_names(provider: &dyn Provider, names: &[&str]) -> Option<App> {
    names
        .iter()
        .find_map(|name| provider.find_app_from_name(name))
}

/// Supported platform families.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// Linux and the BSDs, using freedesktop.org conventions.
    Fdo,
    MacOs,
    Unsupported,
}

impl Platform {
    /// Map an OS name as reported by `std::env::consts::OS`.
    pub fn from_os(os: &str) -> Self {
        match os {
            "linux" | "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Platform::Fdo,
            "macos" => Platform::MacOs,
            _ => Platform::Unsupported,
        }
    }

    /// The platform this binary was built for.
    pub fn detect() -> Self {
        Self::from_os(std::env::consts::OS)
    }
}

/// Create the provider for a platform.
/// Returns None if the platform has no provider.
pub fn provider_for(platform: Platform) -> Option<Box<dyn Provider>> {
    match platform {
        Platform::Fdo => Some(Box::new(FdoProvider::from_env())),
        Platform::MacOs => Some(Box::new(MacOsProvider::new())),
        Platform::Unsupported => None,
    }
}

/// Create the provider for the current system.
pub fn system_provider() -> Option<Box<dyn Provider>> {
    provider_for(Platform::detect())
}
