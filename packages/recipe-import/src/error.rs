//! Typed errors for the import library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbolic classification of an import failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Extraction succeeded but the recipe could not be persisted.
    SaveFailed,

    /// The page could not be fetched or contained no usable recipe data.
    ImportFailed,

    /// Unclassified failure.
    UnknownError,

    /// Transient failure inside the extraction call; the extractor may
    /// re-attempt within its retry budget. Never surfaced as a terminal
    /// job error (see [`ImportError::into_terminal`]).
    Retry,
}

/// Coarse priority for surfacing or alerting on an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// A classified import failure.
///
/// Unlike most library errors this is a plain data value: it is stored on
/// the job that failed, carried in [`crate::events::ImportEvent::Error`]
/// events, and serialized for any UI that surfaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ImportError {
    /// Symbolic failure kind.
    pub code: ErrorCode,

    /// Human-readable explanation.
    pub message: String,

    /// Actionable remediation text, if any.
    pub suggestion: Option<String>,

    /// Whether a brand-new import of the same URL is likely to succeed.
    pub can_retry: bool,

    /// Coarse priority for surfacing.
    pub severity: Option<Severity>,
}

impl ImportError {
    /// Create an error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            suggestion: None,
            can_retry: false,
            severity: None,
        }
    }

    /// A persistence failure. Always retryable via a new import.
    pub fn save_failed(message: impl Into<String>) -> Self {
        Self {
            can_retry: true,
            ..Self::new(ErrorCode::SaveFailed, message)
        }
    }

    /// A fetch or parse failure.
    pub fn import_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ImportFailed, message)
    }

    /// An unclassified failure.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnknownError, message)
    }

    /// A transient failure worth re-attempting within the retry budget.
    pub fn retry(message: impl Into<String>) -> Self {
        Self {
            can_retry: true,
            ..Self::new(ErrorCode::Retry, message)
        }
    }

    /// Attach remediation text.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach a severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Set whether a new import for the same URL is likely to succeed.
    pub fn retryable(mut self, can_retry: bool) -> Self {
        self.can_retry = can_retry;
        self
    }

    /// Whether this error marks a transient mid-extraction failure.
    pub fn is_transient(&self) -> bool {
        self.code == ErrorCode::Retry
    }

    /// Collapse a transient marker into a terminal classification.
    ///
    /// `Retry` only makes sense between attempts; once the budget is
    /// exhausted the failure is reported as `ImportFailed`.
    pub fn into_terminal(mut self) -> Self {
        if self.code == ErrorCode::Retry {
            self.code = ErrorCode::ImportFailed;
        }
        self
    }
}

/// Synchronous rejection of an import request before any job is created.
///
/// These are the only errors `import_recipe` surfaces directly; everything
/// after job creation flows through job state and events instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RequestError {
    /// No signed-in user.
    #[error("imports require a signed-in user")]
    MissingIdentity,

    /// The signed-in user has no owning account to attach recipes to.
    #[error("signed-in user has no owning account")]
    MissingAccount,
}

/// Errors from the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying storage operation failed.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Storage is unreachable or refusing writes.
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },
}
