//! Providers installed as directories on disk
//!
//! Layout of one installed provider:
//!
//! ```text
//! {search_dir}/{provider_id}/
//! ├── provider.toml     # [provider] alias + version
//! └── 1.2.3.sh          # library content (or the manifest's `file`)
//! ```
//!
//! Search directories are scanned in order; the first provider with a given
//! id wins.

use super::manifest::{ProviderManifest, MANIFEST_FILE};
use super::{Provider, ProviderOffer};
use crate::error::{ShmgrError, ShmgrResult};
use crate::version::LibVersion;
use async_trait::async_trait;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// A provider backed by a directory holding `provider.toml`
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    id: String,
    dir: PathBuf,
}

impl DirectoryProvider {
    /// Create a provider for `dir`; its id is the directory name
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let id = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        Self { id, dir }
    }

    /// Directory this provider is installed in
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn manifest(&self) -> ShmgrResult<ProviderManifest> {
        ProviderManifest::from_file(&self.dir.join(MANIFEST_FILE)).await
    }
}

#[async_trait]
impl Provider for DirectoryProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn register(&self) -> ShmgrResult<ProviderOffer> {
        let manifest = self
            .manifest()
            .await
            .map_err(|e| ShmgrError::ProviderRegistration {
                provider: self.id.clone(),
                reason: e.to_string(),
            })?;
        let version = manifest
            .version()
            .map_err(|reason| ShmgrError::ProviderRegistration {
                provider: self.id.clone(),
                reason,
            })?;

        Ok(ProviderOffer::new(
            &self.id,
            manifest.provider.alias,
            version,
        ))
    }

    async fn read_library(&self, alias: &str, version: &LibVersion) -> ShmgrResult<Vec<u8>> {
        let inconsistency = |reason: String| ShmgrError::ProviderInconsistency {
            provider: self.id.clone(),
            alias: alias.to_string(),
            version: *version,
            reason,
        };

        // Re-read the manifest: the installation may have changed since registration
        let manifest = self.manifest().await.map_err(|e| inconsistency(e.to_string()))?;
        let offered = manifest.version().map_err(inconsistency)?;
        if manifest.provider.alias != alias || offered != *version {
            return Err(inconsistency(format!(
                "manifest now offers {} {}",
                manifest.provider.alias, offered
            )));
        }

        let path = self.dir.join(manifest.library_file());
        fs::read(&path)
            .await
            .map_err(|e| inconsistency(format!("reading {}: {}", path.display(), e)))
    }
}

/// Discover installed providers in the given search directories.
///
/// Every subdirectory containing a `provider.toml` becomes a provider, even
/// when its manifest is invalid: that failure surfaces later as a skipped
/// registration. Missing search directories are ignored.
pub async fn discover_providers(search_dirs: &[PathBuf]) -> Vec<DirectoryProvider> {
    let mut seen = HashSet::new();
    let mut providers = Vec::new();

    for dir in search_dirs {
        for path in scan_provider_dir(dir).await {
            let provider = DirectoryProvider::new(path);
            if !seen.insert(provider.id().to_string()) {
                debug!(
                    "Provider {} shadowed by an earlier search directory",
                    provider.dir().display()
                );
                continue;
            }
            providers.push(provider);
        }
    }

    debug!("Discovered {} providers", providers.len());
    providers
}

/// Provider subdirectories of one search directory, sorted by name
async fn scan_provider_dir(dir: &Path) -> Vec<PathBuf> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(e) => e,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!("Skipping provider directory {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut found = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!("Stopped scanning provider directory {}: {}", dir.display(), e);
                break;
            }
        };

        let path = entry.path();
        // metadata follows symlinks, so linked provider installs count
        let is_dir = match fs::metadata(&path).await {
            Ok(meta) => meta.is_dir(),
            Err(e) => {
                debug!("Ignoring {}: {}", path.display(), e);
                false
            }
        };
        if !is_dir {
            continue;
        }

        match fs::try_exists(path.join(MANIFEST_FILE)).await {
            Ok(true) => found.push(path),
            Ok(false) => {}
            Err(e) => warn!("Cannot check {} for a manifest: {}", path.display(), e),
        }
    }

    found.sort();
    found
}
