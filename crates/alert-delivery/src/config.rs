//! Delivery loop configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;
use crate::rate_gate::RateGate;

/// What to do when acknowledging a sent alert fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AckPolicy {
    /// Log and move on; the alert will be offered (and sent) again
    #[default]
    BestEffort,
    /// Retry the acknowledgement before giving up
    Retry {
        /// Extra attempts after the first failure
        attempts: u32,
        /// Pause between attempts (milliseconds)
        backoff_ms: u64,
    },
    /// Fail the whole cycle and fall into the error backoff
    AbortCycle,
}

/// Delivery loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Maximum send rate across all recipients (default: 0.5)
    pub alerts_per_second: f64,
    /// Idle sleep after an empty poll (milliseconds)
    pub no_alerts_interval_ms: u64,
    /// Backoff after a failed cycle (milliseconds)
    pub error_retry_interval_ms: u64,
    pub ack_policy: AckPolicy,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            alerts_per_second: 0.5,
            no_alerts_interval_ms: 5000,
            error_retry_interval_ms: 3000,
            ack_policy: AckPolicy::BestEffort,
        }
    }
}

impl DeliveryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        RateGate::new(self.alerts_per_second)?;
        Ok(())
    }

    pub fn no_alerts_interval(&self) -> Duration {
        Duration::from_millis(self.no_alerts_interval_ms)
    }

    pub fn error_retry_interval(&self) -> Duration {
        Duration::from_millis(self.error_retry_interval_ms)
    }
}
