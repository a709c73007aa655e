//! CLI command implementations

pub mod cache;
pub mod list;
pub mod load;

pub use cache::execute as cache;
pub use list::execute as list;
pub use load::execute as load;

use crate::cache::LibraryCache;
use crate::config::Config;
use crate::provider::{discover_providers, Provider, ProviderRegistry};
use crate::resolver::Resolver;
use std::path::Path;
use tracing::debug;

/// Build a resolver over the configured cache root and provider directories
async fn build_resolver(config: &Config, cache_dir: Option<&Path>) -> Resolver {
    let cache = LibraryCache::new(config.cache_root(cache_dir));
    let search_dirs = config.provider_dirs();
    debug!(
        "Cache root {}, provider search path {:?}",
        cache.root().display(),
        search_dirs
    );

    let providers: Vec<Box<dyn Provider>> = discover_providers(&search_dirs)
        .await
        .into_iter()
        .map(|p| Box::new(p) as Box<dyn Provider>)
        .collect();

    Resolver::new(cache, ProviderRegistry::with_providers(providers))
}
