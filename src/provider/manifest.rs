//! Provider manifest parsing
//!
//! Each installed provider directory has a `provider.toml` manifest naming
//! the library alias and version it offers.

use crate::error::{ShmgrError, ShmgrResult};
use crate::version::{validate_alias, LibVersion};
use serde::Deserialize;
use std::path::Path;

/// Manifest file name inside a provider directory
pub const MANIFEST_FILE: &str = "provider.toml";

/// Parsed provider manifest from provider.toml
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderManifest {
    /// Provider metadata
    pub provider: ProviderMeta,
}

/// `[provider]` section
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMeta {
    /// Library alias offered (e.g. "foo")
    pub alias: String,

    /// Offered version, strict MAJOR.MINOR.PATCH
    pub version: String,

    /// Library file relative to the provider directory (default: `<version>.sh`)
    #[serde(default)]
    pub file: Option<String>,

    /// Human-readable description
    #[serde(default)]
    pub description: String,
}

impl ProviderManifest {
    /// Parse a manifest from a TOML file on disk
    pub async fn from_file(path: &Path) -> ShmgrResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ShmgrError::io(format!("reading provider manifest {}", path.display()), e)
        })?;
        Self::parse(&content).map_err(|reason| ShmgrError::ManifestInvalid {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parse and validate a manifest from a TOML string
    pub fn parse(content: &str) -> Result<Self, String> {
        let manifest: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        validate_alias(&manifest.provider.alias)?;
        manifest.version()?;
        if let Some(file) = &manifest.provider.file {
            if file.is_empty() || file.contains('/') || file.contains('\\') || file.contains("..")
            {
                return Err(format!(
                    "invalid library file '{}': must be a plain file name",
                    file
                ));
            }
        }
        Ok(manifest)
    }

    /// The offered version
    pub fn version(&self) -> Result<LibVersion, String> {
        LibVersion::parse(&self.provider.version)
            .map_err(|e| format!("invalid version '{}': {}", self.provider.version, e))
    }

    /// Library file name inside the provider directory
    pub fn library_file(&self) -> String {
        match &self.provider.file {
            Some(file) => file.clone(),
            None => format!("{}.sh", self.provider.version.trim()),
        }
    }
}
