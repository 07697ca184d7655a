//! Delivery Error Types

use thiserror::Error;

/// Errors raised by the collaborators the delivery loop talks to
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// Collaborator unreachable or transport-level failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Collaborator answered but signalled failure
    #[error("Rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Response body did not match the expected shape
    #[error("Invalid response: {0}")]
    Validation(String),
}

impl DeliveryError {
    /// Whether retrying the same call later may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            DeliveryError::Transport(_) => true,
            DeliveryError::Rejected { status, .. } => *status == 429 || *status >= 500,
            DeliveryError::Validation(_) => false,
        }
    }
}

/// Invalid delivery loop configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("alerts_per_second must be greater than zero with a representable send interval, got {0}")]
    InvalidRate(f64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(DeliveryError::Transport("connection reset".into()).is_retryable());
        assert!(DeliveryError::Rejected { status: 503, message: String::new() }.is_retryable());
        assert!(DeliveryError::Rejected { status: 429, message: String::new() }.is_retryable());
        assert!(!DeliveryError::Rejected { status: 403, message: String::new() }.is_retryable());
        assert!(!DeliveryError::Validation("missing field `title`".into()).is_retryable());
    }
}
