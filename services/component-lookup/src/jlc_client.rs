//! JLCPCB Search Client
//!
//! Queries the JLCPCB parts search page and extracts the component code
//! (`C` number) from the returned markup.

use async_trait::async_trait;
use bomcode_models::LookupFailure;
use bomcode_utils::{BomcodeResult, LookupConfig};
use regex::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

use crate::backend::SearchBackend;

/// Matches `componentCode:"C123` as embedded in the page state script, and
/// the JSON spelling `"componentCode":"C123`. The closing quote is optional
/// so a truncated body still yields its code.
const COMPONENT_CODE_PATTERN: &str = r#"componentCode"?\s*:\s*"([^"]+)"#;

fn component_code_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(COMPONENT_CODE_PATTERN).unwrap())
}

/// Build the search URL. Only spaces are escaped, every other character is
/// appended as-is.
pub fn search_url(base_url: &str, identifier: &str) -> String {
    format!("{}{}", base_url, identifier.replace(' ', "%20"))
}

/// First component code in a raw search response body
pub fn extract_component_code(body: &str) -> Option<String> {
    component_code_regex()
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// JLCPCB search client
pub struct JlcSearchClient {
    client: Client,
    base_url: String,
}

impl JlcSearchClient {
    pub fn new(config: &LookupConfig) -> BomcodeResult<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl SearchBackend for JlcSearchClient {
    async fn fetch(&self, identifier: &str) -> Result<String, LookupFailure> {
        let url = search_url(&self.base_url, identifier);
        tracing::debug!(%url, "Querying component search");

        let response = self.client.get(&url)
            .send()
            .await
            .map_err(|e| classify(identifier, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupFailure::http_status(identifier, status.as_u16()));
        }

        response.text().await
            .map_err(|e| LookupFailure::body(identifier, e.to_string()))
    }

    fn name(&self) -> &str {
        "jlcpcb"
    }
}

fn classify(identifier: &str, error: &reqwest::Error) -> LookupFailure {
    if error.is_timeout() {
        LookupFailure::timeout(identifier, error.to_string())
    } else {
        LookupFailure::transport(identifier, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomcode_models::LookupFailureKind;

    const BASE: &str = "https://jlcpcb.com/parts/componentSearch?searchTxt=";

    #[test]
    fn test_search_url_escapes_spaces_only() {
        assert_eq!(
            search_url(BASE, "RC0603FR-07 10KL"),
            "https://jlcpcb.com/parts/componentSearch?searchTxt=RC0603FR-07%2010KL"
        );
        assert_eq!(search_url(BASE, "A&B#C+D/E"), format!("{}A&B#C+D/E", BASE));
        assert_eq!(search_url(BASE, "  "), format!("{}%20%20", BASE));
    }

    #[test]
    fn test_extracts_code_from_page_state() {
        let body = r#"<script>window.__NUXT__={data:[{componentCode:"C25804",componentModelEn:"0603WAF1002T5E"}]}</script>"#;
        assert_eq!(extract_component_code(body), Some("C25804".to_string()));
    }

    #[test]
    fn test_extracts_json_spelling() {
        let body = r#"{"componentCode": "C7593", "stock": 100}"#;
        assert_eq!(extract_component_code(body), Some("C7593".to_string()));
    }

    #[test]
    fn test_first_match_wins() {
        let body = r#"componentCode:"C1" componentCode:"C2""#;
        assert_eq!(extract_component_code(body), Some("C1".to_string()));
    }

    #[test]
    fn test_unterminated_code_is_extracted() {
        assert_eq!(extract_component_code(r#"{data:[{componentCode:"C25804"#), Some("C25804".to_string()));
    }

    #[test]
    fn test_no_code_in_body() {
        assert_eq!(extract_component_code("<html><body>No results</body></html>"), None);
        assert_eq!(extract_component_code(r#"componentCode:"""#), None);
        assert_eq!(extract_component_code("componentCode:C25804"), None);
    }

    #[test]
    fn test_client_respects_config() {
        let config = LookupConfig::default();
        let client = JlcSearchClient::new(&config).unwrap();
        assert_eq!(client.base_url, BASE);
        assert_eq!(client.name(), "jlcpcb");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_failure() {
        let config = LookupConfig {
            // Port 9 on loopback refuses connections
            base_url: "http://127.0.0.1:9/parts/componentSearch?searchTxt=".to_string(),
            timeout_seconds: 5,
            ..LookupConfig::default()
        };
        let client = JlcSearchClient::new(&config).unwrap();

        let failure = client.fetch("NE555").await.unwrap_err();
        assert_eq!(failure.identifier, "NE555");
        assert!(matches!(failure.kind, LookupFailureKind::Transport | LookupFailureKind::Timeout));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn search_url_has_no_raw_spaces(identifier in "[A-Za-z0-9 ._-]{1,32}") {
                let url = search_url(BASE, &identifier);
                prop_assert!(!url.contains(' '));
                prop_assert_eq!(url[BASE.len()..].replace("%20", " "), identifier);
            }

            #[test]
            fn embedded_code_is_extracted(
                code in "C[0-9]{1,7}",
                prefix in "[a-z<>/ ]{0,40}",
                suffix in "[a-z<>/ ]{0,40}",
            ) {
                let body = format!("{}componentCode:\"{}\"{}", prefix, code, suffix);
                prop_assert_eq!(extract_component_code(&body), Some(code));
            }
        }
    }
}
