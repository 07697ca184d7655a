//! Wire types of the monitoring API

use alert_delivery::{Action, AlertId, AlertStatus, RecipientId, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (alert, recipient) row of `GET alerts/delivery`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertDeliveryRow {
    pub alert_id: AlertId,
    pub receiver_id: RecipientId,
    #[serde(default)]
    pub delivered: bool,
}

/// Alert as returned by `GET alerts/by-id/<id>`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: AlertId,
    pub alias: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub timestamp: DateTime<Utc>,
    pub status: AlertStatus,
    pub severity: Severity,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
    #[serde(default)]
    pub related_graphs: Vec<String>,
}

/// Action as returned by `GET actions`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub alias: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Argument schema of actions that take input
    #[serde(default)]
    pub arguments: Option<serde_json::Map<String, serde_json::Value>>,
}

impl From<ActionRecord> for Action {
    fn from(record: ActionRecord) -> Self {
        Action {
            alias: record.alias,
            title: record.title,
            description: record.description,
        }
    }
}

/// Body of `POST alerts/finish`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkDeliveredRequest {
    pub alert_id: AlertId,
    pub receivers: Vec<RecipientId>,
}
