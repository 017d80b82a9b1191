use bomcode_models::LookupFailure;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum BomcodeError {
    #[error("I/O error on {path}: {message}")]
    Io { path: String, message: String },

    #[error("Workbook error in {path}: {message}")]
    Workbook { path: String, message: String },

    #[error("Input spreadsheet must contain a '{column}' column (found: {})", available.join(", "))]
    MissingColumn { column: String, available: Vec<String> },

    #[error("Lookup error for '{identifier}': {message}")]
    Lookup { identifier: String, message: String },

    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("External service error: {service} - {message}")]
    ExternalService { service: String, message: String },
}

impl BomcodeError {
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn workbook(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Workbook {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn missing_column(column: impl Into<String>, available: &[String]) -> Self {
        Self::MissingColumn {
            column: column.into(),
            available: available.to_vec(),
        }
    }

    pub fn lookup(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Lookup {
            identifier: identifier.into(),
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service: service.into(),
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "IO_ERROR",
            Self::Workbook { .. } => "WORKBOOK_ERROR",
            Self::MissingColumn { .. } => "MISSING_COLUMN",
            Self::Lookup { .. } => "LOOKUP_ERROR",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
        }
    }

    /// Process exit status for a run that ended with this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration { .. } | Self::Validation { .. } => 2,
            _ => 1,
        }
    }
}

pub type BomcodeResult<T> = Result<T, BomcodeError>;

impl From<LookupFailure> for BomcodeError {
    fn from(failure: LookupFailure) -> Self {
        Self::lookup(failure.identifier.clone(), format!("{}: {}", failure.kind, failure.message))
    }
}

impl From<reqwest::Error> for BomcodeError {
    fn from(error: reqwest::Error) -> Self {
        Self::external_service("HTTP Client", error.to_string())
    }
}

impl From<config::ConfigError> for BomcodeError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration(error.to_string())
    }
}
