//! Delivery source and action catalog over the monitoring API
//!
//! The backend reports one row per (alert, recipient) pair and keeps alert
//! details behind a separate endpoint. The loop wants one record per alert
//! carrying all of its recipients, so rows are grouped here and each alert
//! is fetched once per poll. An alert whose details the backend refuses
//! for good is skipped so the rest of the batch still goes out.

use alert_delivery::{
    Action, ActionCatalog, AlertId, Delivery, DeliveryError, DeliverySource, RecipientId,
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::client::MonitoringApi;
use crate::schemas::{AlertDeliveryRow, AlertRecord};

/// Group undelivered rows by alert, in order of first appearance.
///
/// Recipient order within an alert follows the rows; a pair listed twice
/// is kept once.
pub fn group_pending(rows: Vec<AlertDeliveryRow>) -> Vec<(AlertId, Vec<RecipientId>)> {
    let mut groups: Vec<(AlertId, Vec<RecipientId>)> = Vec::new();
    let mut index: HashMap<AlertId, usize> = HashMap::new();

    for row in rows.into_iter().filter(|row| !row.delivered) {
        let slot = *index.entry(row.alert_id).or_insert_with(|| {
            groups.push((row.alert_id, Vec::new()));
            groups.len() - 1
        });
        let recipients = &mut groups[slot].1;
        if !recipients.contains(&row.receiver_id) {
            recipients.push(row.receiver_id);
        }
    }

    groups
}

fn to_delivery(alert: AlertRecord, recipients: Vec<RecipientId>) -> Delivery {
    Delivery {
        alert_id: alert.id,
        recipients,
        status: alert.status,
        severity: alert.severity,
        title: alert.title,
        description: alert.description,
        timestamp: alert.timestamp,
        suggested_actions: alert.suggested_actions,
    }
}

#[async_trait]
impl DeliverySource for MonitoringApi {
    async fn list_pending(&self) -> Result<Vec<Delivery>, DeliveryError> {
        let rows = self.get_alert_deliveries().await?;
        let groups = group_pending(rows);
        debug!("{} alerts with pending deliveries", groups.len());

        let mut deliveries = Vec::with_capacity(groups.len());
        for (alert_id, recipients) in groups {
            match self.get_alert(alert_id).await {
                Ok(alert) => deliveries.push(to_delivery(alert, recipients)),
                Err(e) => {
                    let e = DeliveryError::from(e);
                    if e.is_retryable() {
                        return Err(e);
                    }
                    warn!("Skipping alert {}, failed to fetch its details: {}", alert_id, e);
                }
            }
        }
        Ok(deliveries)
    }

    async fn mark_delivered(
        &self,
        alert_id: AlertId,
        recipients: &[RecipientId],
    ) -> Result<(), DeliveryError> {
        self.mark_alert_delivered(alert_id, recipients).await?;
        Ok(())
    }
}

#[async_trait]
impl ActionCatalog for MonitoringApi {
    async fn actions(&self) -> Result<Vec<Action>, DeliveryError> {
        let records = self.get_actions().await?;
        Ok(records.into_iter().map(Action::from).collect())
    }
}
