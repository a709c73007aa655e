//! Library resolution
//!
//! Answers `alias:version` requests from the cache, falling back to the
//! installed providers on a miss:
//!
//! 1. Look up (alias, major) in the cache; a hit is final.
//! 2. On a miss, collect offers for the alias and build the catalog.
//! 3. Cache the winner of *every* major the alias is offered in, so later
//!    requests for other majors need no provider query either.
//! 4. Look up the cache again.
//!
//! A cached entry below the requested floor is reported as
//! [`ShmgrError::VersionTooLow`]; it is never upgraded implicitly.

use crate::cache::{CacheEntry, LibraryCache};
use crate::catalog::Catalog;
use crate::error::{ShmgrError, ShmgrResult};
use crate::provider::{ProviderRegistry, ProviderWarning};
use crate::version::{LibVersion, LibraryRequest};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Where a resolved library came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LibrarySource {
    /// Served from an existing cache entry
    Cache,
    /// Fetched from a provider during this resolution
    Provider,
}

impl fmt::Display for LibrarySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Provider => write!(f, "provider"),
        }
    }
}

/// A successfully resolved library
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLibrary {
    pub alias: String,
    pub version: LibVersion,
    pub path: PathBuf,
    pub content: Vec<u8>,
    pub source: LibrarySource,
}

/// A request that could not be resolved
#[derive(Debug)]
pub struct ResolveFailure {
    pub token: String,
    pub error: ShmgrError,
}

/// Outcome of resolving several requests, each list in request order
#[derive(Debug, Default)]
pub struct Resolution {
    pub successes: Vec<ResolvedLibrary>,
    pub failures: Vec<ResolveFailure>,
}

impl Resolution {
    /// True iff every request resolved
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Concatenated content of the resolved libraries, in request order.
    ///
    /// Only library bytes end up here; failures are reported separately.
    pub fn script(&self) -> Vec<u8> {
        self.successes
            .iter()
            .flat_map(|lib| lib.content.iter().copied())
            .collect()
    }
}

/// One (alias, major) row of the library inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LibraryListing {
    pub alias: String,
    pub major: u64,
    /// Best version offered by an installed provider
    pub installed: Option<LibVersion>,
    /// Provider owning the installed version
    pub provider: Option<String>,
    /// Version present in the cache
    pub cached: Option<LibVersion>,
}

/// Installed and cached libraries, plus providers that failed to register
#[derive(Debug, Default)]
pub struct Inventory {
    pub libraries: Vec<LibraryListing>,
    pub warnings: Vec<ProviderWarning>,
}

/// Resolves library requests against the cache and the providers
pub struct Resolver {
    cache: LibraryCache,
    registry: ProviderRegistry,
}

impl Resolver {
    pub fn new(cache: LibraryCache, registry: ProviderRegistry) -> Self {
        Self { cache, registry }
    }

    pub fn cache(&self) -> &LibraryCache {
        &self.cache
    }

    /// Resolve a single request
    pub async fn resolve_one(&self, request: &LibraryRequest) -> ShmgrResult<ResolvedLibrary> {
        let alias = request.alias.as_str();
        let major = request.floor.major;

        if let Some(entry) = self.cache.lookup(alias, major).await? {
            return check_floor(entry, request, LibrarySource::Cache);
        }

        self.populate(alias, major).await?;

        match self.cache.lookup(alias, major).await? {
            Some(entry) => check_floor(entry, request, LibrarySource::Provider),
            None => Err(ShmgrError::UnknownLibrary {
                alias: alias.to_string(),
                major,
            }),
        }
    }

    /// Resolve several request tokens independently, preserving order.
    ///
    /// A failing request never stops the others.
    pub async fn resolve_many<S: AsRef<str>>(&self, tokens: &[S]) -> Resolution {
        let mut resolution = Resolution::default();

        for token in tokens {
            let token = token.as_ref();
            let result = match LibraryRequest::parse(token) {
                Ok(request) => self.resolve_one(&request).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(library) => {
                    info!(
                        "Resolved {} to {} {} (from {})",
                        token, library.alias, library.version, library.source
                    );
                    resolution.successes.push(library);
                }
                Err(error) => {
                    if error.is_request_failure() {
                        debug!("Failed to resolve {}: {}", token, error);
                    } else {
                        warn!("Failed to resolve {}: {}", token, error);
                    }
                    resolution.failures.push(ResolveFailure {
                        token: token.to_string(),
                        error,
                    });
                }
            }
        }

        resolution
    }

    /// Installed and cached libraries, optionally for one alias
    pub async fn inventory(&self, alias: Option<&str>) -> ShmgrResult<Inventory> {
        let collected = self.registry.collect_offers(alias).await;
        let catalog = Catalog::build(&collected.offers);

        let mut rows: BTreeMap<(String, u64), LibraryListing> = BTreeMap::new();
        for entry in catalog.iter() {
            let row = rows
                .entry((entry.alias.clone(), entry.version.major))
                .or_insert_with(|| empty_listing(&entry.alias, entry.version.major));
            row.installed = Some(entry.version);
            row.provider = Some(entry.provider.clone());
        }

        for info in self.cache.list().await? {
            if alias.is_some_and(|a| a != info.alias) {
                continue;
            }
            let row = rows
                .entry((info.alias.clone(), info.version.major))
                .or_insert_with(|| empty_listing(&info.alias, info.version.major));
            // Several files per major only appear mid-race; show the highest
            if row.cached.map_or(true, |v| v < info.version) {
                row.cached = Some(info.version);
            }
        }

        Ok(Inventory {
            libraries: rows.into_values().collect(),
            warnings: collected.warnings,
        })
    }

    /// Query providers for `alias` and cache every offered major that is not
    /// cached yet. Errors for the requested major abort; others are logged.
    async fn populate(&self, alias: &str, requested_major: u64) -> ShmgrResult<()> {
        let collected = self.registry.collect_offers(Some(alias)).await;
        let catalog = Catalog::build(&collected.offers);
        let cached: Vec<u64> = self
            .cache
            .versions(alias)
            .await?
            .iter()
            .map(|v| v.major)
            .collect();

        debug!(
            "Catalog for {}: {} major(s) from {} offer(s)",
            alias,
            catalog.entries_for(alias).count(),
            collected.offers.len()
        );
        if catalog.get(alias, requested_major).is_none() {
            debug!("No provider offers {}:{}", alias, requested_major);
        }

        for entry in catalog.entries_for(alias) {
            let major = entry.version.major;
            if cached.contains(&major) {
                debug!("{}:{} already cached, not refreshing", alias, major);
                continue;
            }

            let stored = match self
                .registry
                .read_library(&entry.provider, alias, &entry.version)
                .await
            {
                Ok(content) => self.cache.write(alias, &entry.version, &content).await,
                Err(e) => Err(e),
            };

            match stored {
                Ok(_) => {}
                Err(e) if major == requested_major => return Err(e),
                Err(e) => warn!("Could not cache {} {}: {}", alias, entry.version, e),
            }
        }

        Ok(())
    }
}

fn empty_listing(alias: &str, major: u64) -> LibraryListing {
    LibraryListing {
        alias: alias.to_string(),
        major,
        installed: None,
        provider: None,
        cached: None,
    }
}

fn check_floor(
    entry: CacheEntry,
    request: &LibraryRequest,
    source: LibrarySource,
) -> ShmgrResult<ResolvedLibrary> {
    if !request.floor.is_satisfied_by(&entry.version) {
        return Err(ShmgrError::VersionTooLow {
            alias: entry.alias,
            found: entry.version,
            floor: request.floor,
        });
    }

    Ok(ResolvedLibrary {
        alias: entry.alias,
        version: entry.version,
        path: entry.path,
        content: entry.content,
        source,
    })
}
