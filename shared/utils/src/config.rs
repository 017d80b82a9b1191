use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use validator::Validate;

pub const DEFAULT_SEARCH_URL: &str = "https://jlcpcb.com/parts/componentSearch?searchTxt=";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_CACHE_CAPACITY: usize = 100;
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "Manufacturer Part #";
pub const DEFAULT_RESULT_COLUMN: &str = "ComponentCode";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    #[validate]
    pub lookup: LookupConfig,
    #[validate]
    pub enrichment: EnrichmentConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LookupConfig {
    /// Search endpoint; the escaped identifier is appended verbatim
    #[validate(url(message = "Search URL must be an absolute URL"))]
    pub base_url: String,
    #[validate(length(min = 1, message = "User-Agent must not be empty"))]
    pub user_agent: String,
    /// Request timeout in seconds, 0 waits forever
    pub timeout_seconds: u64,
    #[validate(range(min = 1, message = "Cache capacity must be at least 1"))]
    pub cache_capacity: usize,
    #[validate(range(min = 1, max = 64, message = "Concurrency must be between 1 and 64"))]
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure on the row and keep going
    #[default]
    Skip,
    /// Stop the batch at the first failed lookup
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct EnrichmentConfig {
    #[validate(length(min = 1, message = "Identifier column must not be empty"))]
    pub identifier_column: String,
    #[validate(length(min = 1, message = "Result column must not be empty"))]
    pub result_column: String,
    pub on_lookup_failure: FailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    /// Layered load: config files, then `extra_file` when given, then
    /// `BOMCODE__*` environment variables.
    pub fn load_with(extra_file: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false));

        if let Some(path) = extra_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix("BOMCODE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SEARCH_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: 30,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_concurrency: 4,
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            identifier_column: DEFAULT_IDENTIFIER_COLUMN.to_string(),
            result_column: DEFAULT_RESULT_COLUMN.to_string(),
            on_lookup_failure: FailurePolicy::Skip,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            file_path: None,
        }
    }
}
