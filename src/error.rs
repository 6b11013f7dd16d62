//! Error types for dcli

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for dcli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in dcli
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config not found at {0:?}")]
    ConfigMissing(PathBuf),

    #[error("Config at {path:?} is corrupt: {source}")]
    ConfigCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to save config: {0}")]
    Persistence(String),

    #[error("API error [{status}]: {body}")]
    Api { status: u16, body: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("{0} cannot be empty")]
    EmptyInput(String),

    #[error("Home directory not found")]
    HomeDirMissing,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status attached to an API failure, `0` for transport-level failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Transport(_) => Some(0),
            _ => None,
        }
    }
}
