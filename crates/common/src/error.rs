//! Error types shared across clipsync crates.

use std::path::PathBuf;

/// Top-level error type for clipsync operations.
#[derive(Debug, thiserror::Error)]
pub enum ClipsyncError {
    #[error("Invalid manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("Manifest {path} has no entries")]
    EmptyManifest { path: PathBuf },

    #[error("Entry {index} has a non-positive duration ({duration:.2}s)")]
    InvalidDuration { index: usize, duration: f64 },

    #[error("Audio engine failure: {message}")]
    Engine { message: String },

    #[error("Measured duration of {path} is zero")]
    ZeroDuration { path: PathBuf },

    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias using ClipsyncError.
pub type ClipsyncResult<T> = Result<T, ClipsyncError>;

impl ClipsyncError {
    pub fn invalid_manifest(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::InvalidManifest {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine {
            message: msg.into(),
        }
    }

    pub fn write(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Write {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Errors scoped to a single manifest entry.
    ///
    /// Speed-sync skips these and moves on; assembly treats every error as fatal.
    pub fn is_entry_level(&self) -> bool {
        matches!(
            self,
            Self::InvalidDuration { .. } | Self::Engine { .. } | Self::ZeroDuration { .. }
        )
    }
}
