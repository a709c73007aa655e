//! Version catalog
//!
//! Reduces the offers of all providers to one winner per (alias, major):
//! the greatest version wins, and an exact version tie between providers
//! goes to the lexically smallest provider id. The result never depends on
//! the order providers were enumerated in.

use crate::provider::ProviderOffer;
use crate::version::LibVersion;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

/// Winning offer for one (alias, major)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub alias: String,
    pub version: LibVersion,
    pub provider: String,
}

/// Per-(alias, major) best version table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: BTreeMap<(String, u64), CatalogEntry>,
}

impl Catalog {
    /// Build the catalog from a set of offers
    pub fn build<'a>(offers: impl IntoIterator<Item = &'a ProviderOffer>) -> Self {
        let mut entries: BTreeMap<(String, u64), CatalogEntry> = BTreeMap::new();

        for offer in offers {
            match entries.entry((offer.alias.clone(), offer.version.major)) {
                Entry::Vacant(slot) => {
                    slot.insert(entry_from(offer));
                }
                Entry::Occupied(mut slot) => {
                    if beats(offer, slot.get()) {
                        debug!(
                            "{} {}: {} ({}) replaces {} ({})",
                            offer.alias,
                            offer.version.major,
                            offer.version,
                            offer.provider,
                            slot.get().version,
                            slot.get().provider
                        );
                        slot.insert(entry_from(offer));
                    }
                }
            }
        }

        Self { entries }
    }

    /// Winner for one (alias, major)
    pub fn get(&self, alias: &str, major: u64) -> Option<&CatalogEntry> {
        self.entries.get(&(alias.to_string(), major))
    }

    /// All winners for an alias, ordered by major
    pub fn entries_for<'a>(&'a self, alias: &'a str) -> impl Iterator<Item = &'a CatalogEntry> + 'a {
        self.entries
            .iter()
            .filter(move |((a, _), _)| a == alias)
            .map(|(_, entry)| entry)
    }

    /// All winners ordered by (alias, major)
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn entry_from(offer: &ProviderOffer) -> CatalogEntry {
    CatalogEntry {
        alias: offer.alias.clone(),
        version: offer.version,
        provider: offer.provider.clone(),
    }
}

/// Whether `offer` should replace the current winner of its group
fn beats(offer: &ProviderOffer, current: &CatalogEntry) -> bool {
    if offer.version != current.version {
        return offer.version > current.version;
    }
    if offer.provider != current.provider {
        debug!(
            "{} {} offered by both {} and {}; lower provider id wins",
            offer.alias, offer.version, offer.provider, current.provider
        );
    }
    offer.provider < current.provider
}
