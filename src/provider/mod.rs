//! Shell library providers
//!
//! A provider is an installed component that advertises exactly one
//! `(alias, version)` offer through its registration hook and can later hand
//! back the library content for that offer.
//!
//! The [`ProviderRegistry`] calls every provider's hook and aggregates the
//! offers. A provider whose hook fails is skipped with a warning; one broken
//! provider never blocks resolution of unrelated libraries.

mod directory;
mod manifest;
mod memory;

pub use directory::{discover_providers, DirectoryProvider};
pub use manifest::ProviderManifest;
pub use memory::StaticProvider;

use crate::error::{ShmgrError, ShmgrResult};
use crate::version::{validate_alias, LibVersion};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

/// One provider's advertised library version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderOffer {
    pub provider: String,
    pub alias: String,
    pub version: LibVersion,
}

impl ProviderOffer {
    pub fn new(
        provider: impl Into<String>,
        alias: impl Into<String>,
        version: impl Into<LibVersion>,
    ) -> Self {
        Self {
            provider: provider.into(),
            alias: alias.into(),
            version: version.into(),
        }
    }
}

/// Abstract provider interface
///
/// Implementations:
/// - [`DirectoryProvider`]: a provider installed as a directory on disk
/// - [`StaticProvider`]: a library embedded in memory
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable identity of this provider; offers must carry the same id
    fn id(&self) -> &str;

    /// Registration hook: advertise this provider's offer
    async fn register(&self) -> ShmgrResult<ProviderOffer>;

    /// Read the library content for an offer this provider advertised
    async fn read_library(&self, alias: &str, version: &LibVersion) -> ShmgrResult<Vec<u8>>;
}

/// A provider that was skipped while collecting offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderWarning {
    pub provider: String,
    pub reason: String,
}

/// Result of one round of registration hook calls
#[derive(Debug, Default)]
pub struct CollectedOffers {
    pub offers: Vec<ProviderOffer>,
    pub warnings: Vec<ProviderWarning>,
}

/// Aggregates offers from all installed providers
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Box<dyn Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry from a list of providers (duplicate ids keep the first)
    pub fn with_providers(providers: Vec<Box<dyn Provider>>) -> Self {
        let mut registry = Self::new();
        for provider in providers {
            registry.add(provider);
        }
        registry
    }

    /// Add a provider. Returns false if a provider with the same id exists.
    pub fn add(&mut self, provider: Box<dyn Provider>) -> bool {
        if self.providers.iter().any(|p| p.id() == provider.id()) {
            warn!("Ignoring duplicate provider: {}", provider.id());
            return false;
        }
        self.providers.push(provider);
        true
    }

    /// Number of installed providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Call every provider's registration hook and gather the offers.
    ///
    /// With an alias filter only that alias's offers are kept; every hook is
    /// still invoked because the alias is only known after registration.
    pub async fn collect_offers(&self, alias: Option<&str>) -> CollectedOffers {
        let mut collected = CollectedOffers::default();

        for provider in &self.providers {
            let offer = match provider.register().await {
                Ok(offer) => offer,
                Err(e) => {
                    warn!("Skipping provider {}: {}", provider.id(), e);
                    collected.warnings.push(ProviderWarning {
                        provider: provider.id().to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if let Err(reason) = check_offer(provider.as_ref(), &offer) {
                warn!("Skipping provider {}: {}", provider.id(), reason);
                collected.warnings.push(ProviderWarning {
                    provider: provider.id().to_string(),
                    reason,
                });
                continue;
            }

            if alias.is_some_and(|a| a != offer.alias) {
                continue;
            }

            debug!(
                "Provider {} offers {} {}",
                offer.provider, offer.alias, offer.version
            );
            collected.offers.push(offer);
        }

        collected
    }

    /// Fetch library content from the provider that owns an offer
    pub async fn read_library(
        &self,
        provider_id: &str,
        alias: &str,
        version: &LibVersion,
    ) -> ShmgrResult<Vec<u8>> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.id() == provider_id)
            .ok_or_else(|| ShmgrError::ProviderInconsistency {
                provider: provider_id.to_string(),
                alias: alias.to_string(),
                version: *version,
                reason: "provider is no longer installed".to_string(),
            })?;

        provider
            .read_library(alias, version)
            .await
            .map_err(|e| match e {
                ShmgrError::ProviderInconsistency { .. } => e,
                other => ShmgrError::ProviderInconsistency {
                    provider: provider_id.to_string(),
                    alias: alias.to_string(),
                    version: *version,
                    reason: other.to_string(),
                },
            })
    }
}

fn check_offer(provider: &dyn Provider, offer: &ProviderOffer) -> Result<(), String> {
    if offer.provider != provider.id() {
        return Err(format!(
            "offer claims provider id '{}'",
            offer.provider
        ));
    }
    validate_alias(&offer.alias)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenProvider;

    #[async_trait]
    impl Provider for BrokenProvider {
        fn id(&self) -> &str {
            "broken"
        }

        async fn register(&self) -> ShmgrResult<ProviderOffer> {
            Err(ShmgrError::ProviderRegistration {
                provider: "broken".to_string(),
                reason: "hook exploded".to_string(),
            })
        }

        async fn read_library(&self, _alias: &str, _version: &LibVersion) -> ShmgrResult<Vec<u8>> {
            Err(ShmgrError::User("unreachable".to_string()))
        }
    }

    /// Offers a library under somebody else's provider id
    struct Impostor;

    #[async_trait]
    impl Provider for Impostor {
        fn id(&self) -> &str {
            "impostor"
        }

        async fn register(&self) -> ShmgrResult<ProviderOffer> {
            Ok(ProviderOffer::new("p1", "foo", (9, 0, 0)))
        }

        async fn read_library(&self, _alias: &str, _version: &LibVersion) -> ShmgrResult<Vec<u8>> {
            Ok(b"not mine\n".to_vec())
        }
    }

    fn registry() -> ProviderRegistry {
        ProviderRegistry::with_providers(vec![
            Box::new(StaticProvider::new("p1", "foo", (1, 2, 3), "foo v1\n")),
            Box::new(BrokenProvider),
            Box::new(StaticProvider::new("p2", "bar", (3, 0, 0), "bar v3\n")),
        ])
    }

    #[tokio::test]
    async fn collect_skips_broken_provider() {
        let collected = registry().collect_offers(None).await;

        assert_eq!(
            collected.offers,
            vec![
                ProviderOffer::new("p1", "foo", (1, 2, 3)),
                ProviderOffer::new("p2", "bar", (3, 0, 0)),
            ]
        );
        assert_eq!(collected.warnings.len(), 1);
        assert_eq!(collected.warnings[0].provider, "broken");
        assert!(collected.warnings[0].reason.contains("hook exploded"));
    }

    #[tokio::test]
    async fn collect_filters_by_alias() {
        let collected = registry().collect_offers(Some("bar")).await;
        assert_eq!(collected.offers.len(), 1);
        assert_eq!(collected.offers[0].alias, "bar");
    }

    #[tokio::test]
    async fn collect_rejects_unsafe_alias() {
        let registry = ProviderRegistry::with_providers(vec![Box::new(StaticProvider::new(
            "evil",
            "../etc",
            (1, 0, 0),
            "",
        ))]);
        let collected = registry.collect_offers(None).await;
        assert!(collected.offers.is_empty());
        assert_eq!(collected.warnings[0].provider, "evil");
    }

    #[test]
    fn duplicate_ids_keep_first() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.add(Box::new(StaticProvider::new("p1", "foo", (1, 0, 0), "a"))));
        assert!(!registry.add(Box::new(StaticProvider::new("p1", "foo", (2, 0, 0), "b"))));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn read_library_routes_to_owner() {
        let content = registry()
            .read_library("p2", "bar", &LibVersion::new(3, 0, 0))
            .await
            .unwrap();
        assert_eq!(content, b"bar v3\n");
    }

    #[tokio::test]
    async fn read_library_unknown_provider_is_inconsistency() {
        let err = registry()
            .read_library("gone", "foo", &LibVersion::new(1, 2, 3))
            .await
            .unwrap_err();
        assert!(matches!(err, ShmgrError::ProviderInconsistency { .. }));
    }

    #[tokio::test]
    async fn read_library_wrong_version_is_inconsistency() {
        let err = registry()
            .read_library("p1", "foo", &LibVersion::new(1, 9, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ShmgrError::ProviderInconsistency { .. }));
    }

    #[tokio::test]
    async fn collect_rejects_offer_with_foreign_id() {
        let registry = ProviderRegistry::with_providers(vec![
            Box::new(StaticProvider::new("p1", "foo", (1, 2, 3), "foo v1\n")),
            Box::new(Impostor),
        ]);

        let collected = registry.collect_offers(Some("foo")).await;

        assert_eq!(collected.offers, vec![ProviderOffer::new("p1", "foo", (1, 2, 3))]);
        assert_eq!(collected.warnings.len(), 1);
        assert_eq!(collected.warnings[0].provider, "impostor");
        assert!(collected.warnings[0].reason.contains("'p1'"));
    }
}
