//! Error types for appie-apps

use std::path::PathBuf;

/// Failures while reading an application source or launching an app.
///
/// A missing app or icon is never an error; lookups return `None` instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Desktop entry {0} has no Name")]
    MissingName(PathBuf),

    #[error("Unable to parse application plist {path}: {source}")]
    Plist {
        path: PathBuf,
        #[source]
        source: plist::Error,
    },

    #[error("Failed to decode icon {path}: {source}")]
    Icon {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Application has no command to run")]
    EmptyCommand,

    #[error("Failed to launch {command}: {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;
