//! Monitoring API Client
//!
//! HTTP client for the monitoring backend:
//! - Pending alert deliveries and delivery acknowledgement
//! - Alert details
//! - Remediation action catalog
//!
//! Also adapts the backend's per-recipient delivery rows into the
//! normalized [`alert_delivery::Delivery`] records the delivery loop consumes.

mod adapter;
mod client;
mod error;
mod schemas;

#[cfg(test)]
mod test_server;

pub use adapter::group_pending;
pub use client::MonitoringApi;
pub use error::ApiError;
pub use schemas::{ActionRecord, AlertDeliveryRow, AlertRecord, MarkDeliveredRequest};

use serde::{Deserialize, Serialize};

/// Monitoring API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the backend, e.g. `https://monitoring.example.com/api`
    pub base_url: String,
    /// Bearer token
    pub token: String,
    /// Per-request timeout (milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Only fetch deliveries of alerts younger than this (seconds)
    #[serde(default)]
    pub delivery_window_secs: Option<u64>,
}

fn default_timeout_ms() -> u64 {
    10_000
}
