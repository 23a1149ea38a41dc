use thiserror::Error;

/// Failure taxonomy for the assistant.
///
/// Every error propagates unmodified to the caller: there is no retry,
/// no backoff, and no fallback answer anywhere in this crate.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("backend unreachable: {0}")]
    Connectivity(String),
    #[error("vector index not found: {0}")]
    IndexNotFound(String),
    #[error("upstream error: {0}")]
    Upstream(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AssistantError {
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        AssistantError::Internal(err.to_string())
    }
}
