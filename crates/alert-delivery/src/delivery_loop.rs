//! Alert Delivery Loop
//!
//! Polls the delivery source, sends each (alert, recipient) pair through the
//! rate gate and acknowledges successful sends. Per-recipient failures are
//! logged and skipped; a failed cycle is logged, backed off and restarted
//! from a fresh poll.

use metrics::counter;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::{AckPolicy, DeliveryConfig};
use crate::error::{ConfigError, DeliveryError};
use crate::model::{Delivery, RecipientId};
use crate::ports::{ActionCatalog, DeliverySource, NotificationSink};
use crate::rate_gate::RateGate;
use crate::render;

/// Outcome counters of one polling cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Deliveries fetched
    pub deliveries: usize,
    /// Primary sends attempted
    pub attempted: usize,
    /// Primary sends that succeeded
    pub sent: usize,
    /// Primary sends that failed
    pub failed: usize,
    /// Successful acknowledgements
    pub acked: usize,
    /// Acknowledgements given up on
    pub ack_failures: usize,
    /// Suggested-actions messages sent
    pub suggestions_sent: usize,
}

impl CycleReport {
    /// No send was attempted, either because nothing was pending or because
    /// the fetched deliveries had no recipients
    pub fn is_idle(&self) -> bool {
        self.attempted == 0
    }
}

/// Rate-limited delivery loop over a source, an action catalog and a sink
pub struct DeliveryLoop<S, C, N> {
    source: S,
    catalog: C,
    sink: N,
    config: DeliveryConfig,
    gate: RateGate,
}

impl<S, C, N> DeliveryLoop<S, C, N>
where
    S: DeliverySource,
    C: ActionCatalog,
    N: NotificationSink,
{
    /// Create a new delivery loop
    pub fn new(source: S, catalog: C, sink: N, config: DeliveryConfig) -> Result<Self, ConfigError> {
        let gate = RateGate::new(config.alerts_per_second)?;
        info!(
            "Creating alert delivery loop: {} alerts/s, idle {}ms, error retry {}ms, ack policy {:?}",
            config.alerts_per_second,
            config.no_alerts_interval_ms,
            config.error_retry_interval_ms,
            config.ack_policy
        );
        Ok(Self {
            source,
            catalog,
            sink,
            gate,
            config,
        })
    }

    /// Run forever. Never returns; stop it by dropping or aborting the task.
    pub async fn run(&mut self) {
        info!("Starting alert delivery loop");

        loop {
            match self.run_cycle().await {
                Ok(report) if report.is_idle() => {
                    tokio::time::sleep(self.config.no_alerts_interval()).await;
                }
                Ok(report) => {
                    debug!("Delivery cycle finished: {:?}", report);
                }
                Err(e) => {
                    counter!("alert_delivery_cycle_failures_total").increment(1);
                    error!("Failed to deliver alerts: {}", e);
                    tokio::time::sleep(self.config.error_retry_interval()).await;
                }
            }
        }
    }

    /// Fetch pending deliveries once and drain them.
    ///
    /// The fetched batch lives only for the duration of this call, so an
    /// error discards whatever was left of it.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, DeliveryError> {
        let batch = self.source.list_pending().await?;
        let mut report = CycleReport {
            deliveries: batch.len(),
            ..Default::default()
        };

        if batch.is_empty() {
            debug!("No pending deliveries");
            return Ok(report);
        }

        info!("Got {} pending deliveries", batch.len());

        for delivery in &batch {
            for &recipient in &delivery.recipients {
                self.deliver_to(delivery, recipient, &mut report).await?;
            }
        }

        Ok(report)
    }

    async fn deliver_to(
        &mut self,
        delivery: &Delivery,
        recipient: RecipientId,
        report: &mut CycleReport,
    ) -> Result<(), DeliveryError> {
        self.gate.wait().await;

        let started_at = Instant::now();
        let message = render::render_alert(delivery);
        let sent = match self.sink.send(recipient, &message).await {
            Ok(()) => {
                counter!("alert_delivery_sent_total").increment(1);
                debug!("Alert {} sent to {}", delivery.alert_id, recipient);
                true
            }
            Err(e) => {
                counter!("alert_delivery_send_failures_total").increment(1);
                warn!(
                    retryable = e.is_retryable(),
                    "Failed to send alert {} to {}: {}", delivery.alert_id, recipient, e
                );
                false
            }
        };
        self.gate.record(started_at);
        report.attempted += 1;

        if delivery.wants_suggestions() {
            match self.send_suggestions(delivery, recipient).await {
                Ok(true) => report.suggestions_sent += 1,
                Ok(false) => {}
                Err(e) => warn!(
                    "Failed to send suggested actions for alert {} to {}: {}",
                    delivery.alert_id, recipient, e
                ),
            }
        }

        if !sent {
            report.failed += 1;
            return Ok(());
        }
        report.sent += 1;

        match self.acknowledge(delivery, recipient).await {
            Ok(()) => report.acked += 1,
            Err(e) => {
                counter!("alert_delivery_ack_failures_total").increment(1);
                if self.config.ack_policy == AckPolicy::AbortCycle {
                    return Err(e);
                }
                report.ack_failures += 1;
                warn!(
                    "Failed to mark alert {} delivered to {}, it will be sent again: {}",
                    delivery.alert_id, recipient, e
                );
            }
        }

        Ok(())
    }

    /// Returns whether a suggestions message went out
    async fn send_suggestions(
        &self,
        delivery: &Delivery,
        recipient: RecipientId,
    ) -> Result<bool, DeliveryError> {
        let catalog = self.catalog.actions().await?;
        let actions = render::suggested(catalog, &delivery.suggested_actions);
        if actions.is_empty() {
            debug!(
                "None of the suggested actions for alert {} are in the catalog",
                delivery.alert_id
            );
            return Ok(false);
        }

        let message = render::render_suggested_actions(&actions);
        self.sink.send(recipient, &message).await?;
        counter!("alert_delivery_suggestions_sent_total").increment(1);
        Ok(true)
    }

    async fn acknowledge(
        &self,
        delivery: &Delivery,
        recipient: RecipientId,
    ) -> Result<(), DeliveryError> {
        let recipients = [recipient];
        let mut result = self.source.mark_delivered(delivery.alert_id, &recipients).await;

        if let AckPolicy::Retry { attempts, backoff_ms } = self.config.ack_policy {
            for attempt in 1..=attempts {
                match &result {
                    Ok(()) => break,
                    Err(e) => debug!(
                        "Retrying ack of alert {} for {} ({}/{}): {}",
                        delivery.alert_id, recipient, attempt, attempts, e
                    ),
                }
                tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)).await;
                result = self.source.mark_delivered(delivery.alert_id, &recipients).await;
            }
        }

        result
    }
}
