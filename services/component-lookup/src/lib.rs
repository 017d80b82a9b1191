//! bomcode component lookup
//!
//! Resolves manufacturer part numbers to JLCPCB component codes and enriches
//! BOM spreadsheets with them.

pub mod backend;
pub mod cache;
pub mod jlc_client;
pub mod mock;
pub mod resolver;
pub mod service;

pub use backend::SearchBackend;
pub use cache::LookupCache;
pub use jlc_client::{extract_component_code, search_url, JlcSearchClient};
pub use mock::{MockResponse, MockSearchBackend};
pub use resolver::ComponentResolver;
pub use service::EnrichmentService;
