pub mod config;
pub mod logging;
pub mod error;
pub mod validation;
pub mod bom;

pub use config::*;
pub use logging::*;
pub use error::*;
pub use validation::*;
pub use bom::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.lookup.cache_capacity, 100);
        assert_eq!(config.lookup.base_url, "https://jlcpcb.com/parts/componentSearch?searchTxt=");
        assert_eq!(config.enrichment.identifier_column, "Manufacturer Part #");
        assert_eq!(config.enrichment.result_column, "ComponentCode");
        assert_eq!(config.enrichment.on_lookup_failure, FailurePolicy::Skip);
    }

    #[test]
    fn test_config_deserializes_partial_sections() {
        let config: AppConfig = serde_json::from_str(
            r#"{"lookup": {"cache_capacity": 5}, "enrichment": {"on_lookup_failure": "abort"}}"#,
        )
        .unwrap();
        assert_eq!(config.lookup.cache_capacity, 5);
        assert_eq!(config.lookup.max_concurrency, 4);
        assert_eq!(config.enrichment.on_lookup_failure, FailurePolicy::Abort);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_error_handling() {
        let error = BomcodeError::missing_column("Manufacturer Part #", &["Designator".to_string()]);
        assert_eq!(error.error_code(), "MISSING_COLUMN");
        assert_eq!(error.exit_code(), 1);
        assert_eq!(
            error.to_string(),
            "Input spreadsheet must contain a 'Manufacturer Part #' column (found: Designator)"
        );
        assert_eq!(BomcodeError::configuration("bad").exit_code(), 2);
    }

    #[test]
    fn test_lookup_failure_converts() {
        let failure = bomcode_models::LookupFailure::http_status("NE555", 502);
        let error = BomcodeError::from(failure);
        assert_eq!(error.error_code(), "LOOKUP_ERROR");
        assert!(error.to_string().contains("NE555"));
    }
}
