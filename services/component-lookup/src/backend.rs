//! Search backend trait
//!
//! The seam between the resolver and the network: a backend turns one
//! identifier into the raw body of its search results page.

use async_trait::async_trait;
use bomcode_models::LookupFailure;

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Fetch the search results page for `identifier`
    async fn fetch(&self, identifier: &str) -> Result<String, LookupFailure>;

    /// Backend name used in logs
    fn name(&self) -> &str;
}
