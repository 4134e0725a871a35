//! Error types for the briefing pipeline.
//!
//! Errors are classified by recoverability:
//! - Retryable: network issues, API errors, empty/invalid generations,
//!   failed count validation
//! - NonRetryable: missing credentials (falls back immediately)
//!
//! Nothing here ever escapes the AI-assisted path: every generation error
//! terminates in the deterministic fallback. `PipelineError` only covers the
//! batch join itself.

use thiserror::Error;

/// Errors from the generation service round-trips.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("network error: {0}")]
    Network(String),

    #[error("generation API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("generation service returned an empty response")]
    EmptyResponse,

    #[error("failed to parse generation response: {0}")]
    InvalidResponse(String),

    #[error("generated document failed count validation")]
    ValidationFailed,

    #[error("no API key configured for the generation service")]
    MissingCredentials,
}

impl GenerateError {
    /// Returns true if this error counts against the bounded retry budget.
    /// Non-retryable errors skip straight to the deterministic fallback.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, GenerateError::MissingCredentials)
    }
}

/// Errors from batch processing. Per-project rendering itself is total; only
/// the task join can fail, and an unrecovered join failure aborts the batch.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("project task panicked or was cancelled: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for PipelineError {
    fn from(err: tokio::task::JoinError) -> Self {
        PipelineError::Join(err.to_string())
    }
}
