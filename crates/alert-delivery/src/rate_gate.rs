//! Send rate gate

use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::error::ConfigError;

/// Spaces consecutive send initiations at least `1s / rate` apart.
///
/// Holds the instant the previous send was initiated. The gate is owned by
/// a single delivery loop, so it needs no synchronization.
#[derive(Debug, Clone)]
pub struct RateGate {
    interval: Duration,
    last_send: Option<Instant>,
}

impl RateGate {
    /// Create a gate for `per_second` sends per second.
    ///
    /// The rate must be positive and large enough for `1s / rate` to fit in
    /// a `Duration`.
    pub fn new(per_second: f64) -> Result<Self, ConfigError> {
        if !per_second.is_finite() || per_second <= 0.0 {
            return Err(ConfigError::InvalidRate(per_second));
        }
        let interval = Duration::try_from_secs_f64(1.0 / per_second)
            .map_err(|_| ConfigError::InvalidRate(per_second))?;
        Ok(Self {
            interval,
            last_send: None,
        })
    }

    /// Minimum spacing between send initiations
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// How long a send initiated at `now` has to wait
    pub fn delay(&self, now: Instant) -> Duration {
        match self.last_send {
            Some(last) => self.interval.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Suspend until the next send is permitted
    pub async fn wait(&self) {
        let delay = self.delay(Instant::now());
        if !delay.is_zero() {
            debug!("Rate gate: waiting {}ms", delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }

    /// Record that a send was initiated at `started_at`
    pub fn record(&mut self, started_at: Instant) {
        self.last_send = Some(started_at);
    }
}
