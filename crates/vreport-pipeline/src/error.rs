//! Pipeline error taxonomy.
//!
//! Transport and contract failures are caught at the stage boundary and
//! converted into sentinel values or omitted items; only `Fatal` escapes
//! to the orchestrator's top-level boundary.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// Endpoint unreachable, timeout, or non-2xx status.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Model output did not contain a parseable JSON object.
    #[error("Contract error: {0}")]
    Contract(String),

    /// Parsed JSON is missing required fields for its declared kind.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unexpected internal error.
    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl PipelineError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn contract(msg: impl Into<String>) -> Self {
        Self::Contract(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::Fatal(msg.into())
    }

    /// Check if error is retryable. Only transport failures are; a
    /// contract or validation failure will not improve on replay.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Transport(_))
    }
}
