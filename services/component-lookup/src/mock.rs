//! Mock search backend for deterministic testing
//!
//! Serves canned search pages per identifier and counts the requests it
//! receives, so tests can assert how many lookups actually hit the "network".
//!
//! ```rust,ignore
//! let backend = MockSearchBackend::new()
//!     .with_code("ACME-100", "C100")
//!     .with_status("FLAKY-1", 503);
//! ```

use async_trait::async_trait;
use bomcode_models::LookupFailure;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;

use crate::backend::SearchBackend;

const EMPTY_RESULTS_PAGE: &str = "<html><body><div class=\"empty\">No results</div></body></html>";

/// What the mock answers for one identifier
#[derive(Debug, Clone)]
pub enum MockResponse {
    Body(String),
    Status(u16),
    Transport(String),
}

pub struct MockSearchBackend {
    responses: HashMap<String, MockResponse>,
    requests: Mutex<HashMap<String, usize>>,
    latency: Option<Duration>,
}

impl Default for MockSearchBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearchBackend {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requests: Mutex::new(HashMap::new()),
            latency: None,
        }
    }

    /// Serve a search page whose state carries `code`
    pub fn with_code(self, identifier: impl Into<String>, code: &str) -> Self {
        let body = format!(
            "<html><script>window.__NUXT__={{data:[{{componentCode:\"{}\",stockCount:1200}}]}}</script></html>",
            code
        );
        self.with_body(identifier, body)
    }

    pub fn with_body(mut self, identifier: impl Into<String>, body: impl Into<String>) -> Self {
        self.responses.insert(identifier.into(), MockResponse::Body(body.into()));
        self
    }

    pub fn with_status(mut self, identifier: impl Into<String>, status: u16) -> Self {
        self.responses.insert(identifier.into(), MockResponse::Status(status));
        self
    }

    pub fn with_transport_error(mut self, identifier: impl Into<String>, message: impl Into<String>) -> Self {
        self.responses.insert(identifier.into(), MockResponse::Transport(message.into()));
        self
    }

    /// Delay every response, useful to overlap concurrent lookups
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn request_count(&self, identifier: &str) -> usize {
        self.requests.lock().get(identifier).copied().unwrap_or(0)
    }

    pub fn total_requests(&self) -> usize {
        self.requests.lock().values().sum()
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    async fn fetch(&self, identifier: &str) -> Result<String, LookupFailure> {
        *self.requests.lock().entry(identifier.to_string()).or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.responses.get(identifier) {
            Some(MockResponse::Body(body)) => Ok(body.clone()),
            Some(MockResponse::Status(status)) => Err(LookupFailure::http_status(identifier, *status)),
            Some(MockResponse::Transport(message)) => Err(LookupFailure::transport(identifier, message.clone())),
            None => Ok(EMPTY_RESULTS_PAGE.to_string()),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
