use anyhow::anyhow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("Retryable error: {0}")]
    Retryable(anyhow::Error),

    #[error("Terminal error: {0}")]
    Terminal(anyhow::Error),

    /// The service refused the request because the caller's quota is spent.
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(anyhow::Error),

    /// The service answered, but the payload did not match the requested
    /// response shape.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(anyhow::Error),
}

impl AiError {
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExhausted(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable(_))
    }
}

impl From<serde_json::Error> for AiError {
    fn from(source: serde_json::Error) -> Self {
        Self::SchemaMismatch(anyhow!(source))
    }
}
