//! In-memory provider

use super::{Provider, ProviderOffer};
use crate::error::{ShmgrError, ShmgrResult};
use crate::version::LibVersion;
use async_trait::async_trait;

/// A provider whose library content lives in memory
#[derive(Debug, Clone)]
pub struct StaticProvider {
    id: String,
    alias: String,
    version: LibVersion,
    content: Vec<u8>,
}

impl StaticProvider {
    pub fn new(
        id: impl Into<String>,
        alias: impl Into<String>,
        version: impl Into<LibVersion>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            id: id.into(),
            alias: alias.into(),
            version: version.into(),
            content: content.into(),
        }
    }
}

#[async_trait]
impl Provider for StaticProvider {
    fn id(&self) -> &str {
        &self.id
    }

    async fn register(&self) -> ShmgrResult<ProviderOffer> {
        Ok(ProviderOffer::new(&self.id, &self.alias, self.version))
    }

    async fn read_library(&self, alias: &str, version: &LibVersion) -> ShmgrResult<Vec<u8>> {
        if alias != self.alias || *version != self.version {
            return Err(ShmgrError::ProviderInconsistency {
                provider: self.id.clone(),
                alias: alias.to_string(),
                version: *version,
                reason: format!("only {} {} is available", self.alias, self.version),
            });
        }
        Ok(self.content.clone())
    }
}
