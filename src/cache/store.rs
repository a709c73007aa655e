//! On-disk library cache
//!
//! Tracks one resolved version per (alias, major) and publishes new entries
//! atomically so a concurrent reader never sees a partial file.

use crate::error::{ShmgrError, ShmgrResult};
use crate::version::{validate_alias, LibVersion};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use uuid::Uuid;

/// Extension of cached library files
pub const LIBRARY_EXT: &str = "sh";

/// Format bytes as human-readable size (e.g., "1.5 KB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// A cached library with its content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub alias: String,
    pub version: LibVersion,
    pub path: PathBuf,
    pub content: Vec<u8>,
}

/// Metadata about a cached library (for listings)
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntryInfo {
    pub alias: String,
    pub version: LibVersion,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub cached_at: Option<DateTime<Utc>>,
}

/// Library cache rooted at a directory: `{root}/{alias}/{version}.sh`
#[derive(Debug, Clone)]
pub struct LibraryCache {
    root: PathBuf,
}

impl LibraryCache {
    /// Create a cache handle; nothing is created on disk until the first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a given entry is published at
    pub fn entry_path(&self, alias: &str, version: &LibVersion) -> PathBuf {
        self.root
            .join(alias)
            .join(format!("{}.{}", version, LIBRARY_EXT))
    }

    /// Look up the cached entry for one (alias, major).
    ///
    /// If several versions of the same major are present (two writers racing
    /// with different provider sets), the highest one is used.
    pub async fn lookup(&self, alias: &str, major: u64) -> ShmgrResult<Option<CacheEntry>> {
        // A concurrent writer may prune the file between scan and read; rescan once
        for _ in 0..2 {
            let best = self
                .cached_versions(alias)
                .await?
                .into_iter()
                .filter(|(version, _)| version.major == major)
                .max_by_key(|(version, _)| *version);

            let Some((version, path)) = best else {
                debug!("Cache miss: {}:{}", alias, major);
                return Ok(None);
            };

            match fs::read(&path).await {
                Ok(content) => {
                    debug!("Cache hit: {} {} ({})", alias, version, path.display());
                    return Ok(Some(CacheEntry {
                        alias: alias.to_string(),
                        version,
                        path,
                        content,
                    }));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(ShmgrError::io(
                        format!("reading cached library {}", path.display()),
                        e,
                    ))
                }
            }
        }

        Ok(None)
    }

    /// Publish a library version into the cache.
    ///
    /// Content goes to a hidden temp file in the alias directory and is then
    /// renamed into place. Older versions of the same major are removed
    /// afterwards; other majors and other aliases are never touched.
    pub async fn write(
        &self,
        alias: &str,
        version: &LibVersion,
        content: &[u8],
    ) -> ShmgrResult<CacheEntry> {
        validate_alias(alias).map_err(ShmgrError::User)?;

        let dir = self.root.join(alias);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| ShmgrError::io(format!("creating cache directory {}", dir.display()), e))?;

        let path = self.entry_path(alias, version);
        let tmp = dir.join(format!(
            ".{}.{}.{}.tmp",
            version,
            LIBRARY_EXT,
            Uuid::new_v4().simple()
        ));

        if let Err(e) = publish(&tmp, &path, content).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }
        info!("Cached {} {} at {}", alias, version, path.display());

        for (old, old_path) in self.cached_versions(alias).await? {
            if old.major == version.major && old < *version {
                debug!("Removing superseded cache entry {}", old_path.display());
                remove_if_exists(&old_path).await?;
            }
        }

        Ok(CacheEntry {
            alias: alias.to_string(),
            version: *version,
            path,
            content: content.to_vec(),
        })
    }

    /// Cached versions of an alias, ascending
    pub async fn versions(&self, alias: &str) -> ShmgrResult<Vec<LibVersion>> {
        Ok(self
            .cached_versions(alias)
            .await?
            .into_iter()
            .map(|(version, _)| version)
            .collect())
    }

    /// All cached entries, sorted by alias then version
    pub async fn list(&self) -> ShmgrResult<Vec<CacheEntryInfo>> {
        let mut infos = Vec::new();

        for alias in self.aliases().await? {
            for (version, path) in self.cached_versions(&alias).await? {
                let meta = match fs::metadata(&path).await {
                    Ok(meta) => meta,
                    Err(e) if e.kind() == ErrorKind::NotFound => continue,
                    Err(e) => {
                        return Err(ShmgrError::io(
                            format!("reading metadata of {}", path.display()),
                            e,
                        ))
                    }
                };
                infos.push(CacheEntryInfo {
                    alias: alias.clone(),
                    version,
                    path,
                    size_bytes: meta.len(),
                    cached_at: meta.modified().ok().map(DateTime::<Utc>::from),
                });
            }
        }

        Ok(infos)
    }

    /// Remove cached entries (all aliases, or one). Returns entries removed.
    pub async fn clear(&self, alias: Option<&str>) -> ShmgrResult<usize> {
        let aliases = match alias {
            Some(alias) => {
                validate_alias(alias).map_err(ShmgrError::User)?;
                vec![alias.to_string()]
            }
            None => self.aliases().await?,
        };

        let mut removed = 0;
        for alias in aliases {
            let dir = self.root.join(&alias);
            for (_, path) in self.cached_versions(&alias).await? {
                remove_if_exists(&path).await?;
                removed += 1;
            }
            // Leftover temp files belong to writers that are gone or still
            // running; only an empty directory is removed
            if fs::remove_dir(&dir).await.is_ok() {
                debug!("Removed cache directory {}", dir.display());
            }
        }

        info!("Removed {} cached library files", removed);
        Ok(removed)
    }

    /// Alias directories under the root, sorted
    async fn aliases(&self) -> ShmgrResult<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(e) => e,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(ShmgrError::io(
                    format!("reading cache directory {}", self.root.display()),
                    e,
                ))
            }
        };

        let mut aliases = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ShmgrError::io("reading cache directory entry", e))?
        {
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if validate_alias(&name).is_ok() {
                aliases.push(name);
            }
        }

        aliases.sort();
        Ok(aliases)
    }

    /// Published versions of an alias, sorted ascending
    async fn cached_versions(&self, alias: &str) -> ShmgrResult<Vec<(LibVersion, PathBuf)>> {
        let dir = self.root.join(alias);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(e) => e,
            // A stray file where the alias directory belongs holds no entries
            Err(e) if is_missing_dir(&e) => return Ok(Vec::new()),
            Err(e) => {
                return Err(ShmgrError::io(
                    format!("reading cache directory {}", dir.display()),
                    e,
                ))
            }
        };

        let mut versions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ShmgrError::io("reading cache directory entry", e))?
        {
            let name = entry.file_name();
            if let Some(version) = parse_entry_name(&name.to_string_lossy()) {
                versions.push((version, entry.path()));
            }
        }

        versions.sort_by_key(|(version, _)| *version);
        Ok(versions)
    }
}

/// `1.2.3.sh` -> 1.2.3; hidden, temp and foreign files -> None
fn parse_entry_name(name: &str) -> Option<LibVersion> {
    if name.starts_with('.') {
        return None;
    }
    let stem = name.strip_suffix(LIBRARY_EXT)?.strip_suffix('.')?;
    LibVersion::parse(stem).ok()
}

async fn publish(tmp: &Path, path: &Path, content: &[u8]) -> ShmgrResult<()> {
    let mut file = fs::File::create(tmp)
        .await
        .map_err(|e| ShmgrError::io(format!("creating {}", tmp.display()), e))?;
    file.write_all(content)
        .await
        .map_err(|e| ShmgrError::io(format!("writing {}", tmp.display()), e))?;
    file.sync_all()
        .await
        .map_err(|e| ShmgrError::io(format!("syncing {}", tmp.display()), e))?;
    drop(file);

    fs::rename(tmp, path)
        .await
        .map_err(|e| ShmgrError::io(format!("publishing {}", path.display()), e))
}

fn is_missing_dir(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

async fn remove_if_exists(path: &Path) -> ShmgrResult<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ShmgrError::io(format!("removing {}", path.display()), e)),
    }
}
