//! Component Resolver
//!
//! Resolves one manufacturer part number to a component code: a cached
//! lookup through the search backend followed by code extraction over the
//! raw response body.

use bomcode_models::{CacheStats, LookupFailure, LookupOutcome};
use std::sync::Arc;
use tracing::Instrument;

use crate::backend::SearchBackend;
use crate::cache::LookupCache;
use crate::jlc_client::extract_component_code;

pub struct ComponentResolver {
    backend: Arc<dyn SearchBackend>,
    cache: LookupCache,
}

impl ComponentResolver {
    pub fn new(backend: Arc<dyn SearchBackend>, cache_capacity: usize) -> Self {
        Self {
            backend,
            cache: LookupCache::new(cache_capacity),
        }
    }

    /// Resolve `identifier`, hitting the network at most once per cached
    /// identifier. `NotFound` is an answer; `Err` means the lookup itself
    /// failed and nothing was cached.
    pub async fn resolve(&self, identifier: &str) -> Result<LookupOutcome, LookupFailure> {
        self.cache
            .get_or_resolve(identifier, || self.lookup(identifier))
            .await
    }

    async fn lookup(&self, identifier: &str) -> Result<LookupOutcome, LookupFailure> {
        let span = tracing::info_span!("lookup", identifier = %identifier, backend = self.backend.name());

        async {
            let body = self.backend.fetch(identifier).await?;

            match extract_component_code(&body) {
                Some(code) => {
                    tracing::debug!(code = %code, "Resolved component code");
                    Ok(LookupOutcome::Found(code))
                }
                None => {
                    tracing::warn!(identifier = %identifier, "Could not find component code for product: {}", identifier);
                    Ok(LookupOutcome::NotFound)
                }
            }
        }
        .instrument(span)
        .await
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
