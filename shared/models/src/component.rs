//! Component lookup models.
//!
//! This module defines the result of resolving a manufacturer part number
//! against the vendor search page, and the classified failure raised when
//! the lookup itself could not be completed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome of a completed lookup. Both variants are cacheable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "status", content = "code", rename_all = "snake_case")]
pub enum LookupOutcome {
    /// The search page carried a component code token.
    Found(String),
    /// The search page was fetched but carried no component code.
    NotFound,
}

impl LookupOutcome {
    /// Returns the component code if one was found
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Found(code) => Some(code.as_str()),
            Self::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn into_code(self) -> Option<String> {
        match self {
            Self::Found(code) => Some(code),
            Self::NotFound => None,
        }
    }
}

impl From<Option<String>> for LookupOutcome {
    fn from(code: Option<String>) -> Self {
        match code {
            Some(code) => Self::Found(code),
            None => Self::NotFound,
        }
    }
}

/// Classification of a lookup that never produced a response body to search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum LookupFailureKind {
    /// DNS, connect, TLS or any other transport level fault
    Transport,
    /// The request exceeded the configured timeout
    Timeout,
    /// The server answered with a non-2xx status
    HttpStatus(u16),
    /// The response body could not be read
    Body,
}

impl LookupFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::HttpStatus(_) => "http_status",
            Self::Body => "body",
        }
    }
}

impl std::fmt::Display for LookupFailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HttpStatus(status) => write!(f, "http status {}", status),
            other => f.write_str(other.as_str()),
        }
    }
}

/// A lookup that failed before extraction could run. Never cached.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[error("lookup for '{identifier}' failed ({kind}): {message}")]
pub struct LookupFailure {
    pub identifier: String,
    pub kind: LookupFailureKind,
    pub message: String,
}

impl LookupFailure {
    pub fn new(identifier: impl Into<String>, kind: LookupFailureKind, message: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn transport(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(identifier, LookupFailureKind::Transport, message)
    }

    pub fn timeout(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(identifier, LookupFailureKind::Timeout, message)
    }

    pub fn http_status(identifier: impl Into<String>, status: u16) -> Self {
        Self::new(
            identifier,
            LookupFailureKind::HttpStatus(status),
            format!("search endpoint returned status {}", status),
        )
    }

    pub fn body(identifier: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(identifier, LookupFailureKind::Body, message)
    }
}

/// Per-row result of an enrichment pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowStatus {
    Resolved { code: String },
    NotFound,
    Failed { failure: LookupFailure },
    /// The identifier cell was blank, no lookup was made
    Skipped,
}

impl RowStatus {
    /// Value written into the result column for this row
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Resolved { code } => Some(code.as_str()),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&LookupFailure> {
        match self {
            Self::Failed { failure } => Some(failure),
            _ => None,
        }
    }
}

impl From<LookupOutcome> for RowStatus {
    fn from(outcome: LookupOutcome) -> Self {
        match outcome {
            LookupOutcome::Found(code) => Self::Resolved { code },
            LookupOutcome::NotFound => Self::NotFound,
        }
    }
}

impl From<Result<LookupOutcome, LookupFailure>> for RowStatus {
    fn from(result: Result<LookupOutcome, LookupFailure>) -> Self {
        match result {
            Ok(outcome) => outcome.into(),
            Err(failure) => Self::Failed { failure },
        }
    }
}
