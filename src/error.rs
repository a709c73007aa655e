//! Error types for shmgr
//!
//! All modules use `ShmgrResult<T>` as their return type.

use crate::version::{LibVersion, VersionFloor};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for shmgr operations
pub type ShmgrResult<T> = Result<T, ShmgrError>;

/// All errors that can occur in shmgr
#[derive(Error, Debug)]
pub enum ShmgrError {
    // Request errors
    #[error("Malformed library request '{token}': {reason}")]
    MalformedRequest { token: String, reason: String },

    // Resolution errors
    #[error("Unknown shell library: no provider offers {alias}:{major}")]
    UnknownLibrary { alias: String, major: u64 },

    #[error("Version too low for {alias}: found {found}, need >={floor}")]
    VersionTooLow {
        alias: String,
        found: LibVersion,
        floor: VersionFloor,
    },

    #[error("Provider {provider} cannot supply {alias} {version}: {reason}")]
    ProviderInconsistency {
        provider: String,
        alias: String,
        version: LibVersion,
        reason: String,
    },

    #[error("Provider {provider} failed to register: {reason}")]
    ProviderRegistration { provider: String, reason: String },

    #[error("Invalid provider manifest at {path}: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    User(String),
}

impl ShmgrError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a malformed request error
    pub fn malformed(token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRequest {
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error belongs to a single library request rather than
    /// to the environment (config, IO, ...)
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedRequest { .. }
                | Self::UnknownLibrary { .. }
                | Self::VersionTooLow { .. }
                | Self::ProviderInconsistency { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MalformedRequest { .. } => {
                Some("Requests look like NAME:MAJOR, NAME:MAJOR.MINOR or NAME:MAJOR.MINOR.PATCH")
            }
            Self::UnknownLibrary { .. } => Some("Run: shmgr list"),
            Self::VersionTooLow { .. } => {
                Some("The cached copy is older; run: shmgr cache clear <alias>")
            }
            Self::ProviderInconsistency { .. } => Some("Reinstall the provider package"),
            _ => None,
        }
    }
}
