//! Monitoring API Error Types

use alert_delivery::DeliveryError;
use thiserror::Error;

/// Errors returned by the monitoring API client
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request could not be sent or its response could not be read
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    /// Response body does not match the expected schema
    #[error("Failed to parse response: {0}")]
    ResultParse(String),
}

impl From<ApiError> for DeliveryError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Network(e) => DeliveryError::Transport(e.to_string()),
            ApiError::Request { status, body } => DeliveryError::Rejected {
                status,
                message: body,
            },
            ApiError::ResultParse(msg) => DeliveryError::Validation(msg),
        }
    }
}
