//! Normalized delivery records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend identifier of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub i64);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chat handle of an alert recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipientId(pub i64);

impl fmt::Display for RecipientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Alert lifecycle status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertStatus {
    Fired,
    Resolved,
    /// Any status the backend reports that we have no special handling for
    Other(String),
}

impl AlertStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AlertStatus::Fired => "fired",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Other(status) => status,
        }
    }
}

impl From<String> for AlertStatus {
    fn from(status: String) -> Self {
        match status.as_str() {
            "fired" => AlertStatus::Fired,
            "resolved" => AlertStatus::Resolved,
            _ => AlertStatus::Other(status),
        }
    }
}

impl From<AlertStatus> for String {
    fn from(status: AlertStatus) -> Self {
        match status {
            AlertStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

/// Alert severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Critical,
}

/// One alert to be sent to a set of recipients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub alert_id: AlertId,
    /// Recipients in source order
    pub recipients: Vec<RecipientId>,
    pub status: AlertStatus,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    /// Aliases of remediation actions suggested for this alert
    #[serde(default)]
    pub suggested_actions: Vec<String>,
}

impl Delivery {
    /// Whether a follow-up "suggested actions" message should go out
    pub fn wants_suggestions(&self) -> bool {
        self.status != AlertStatus::Resolved && !self.suggested_actions.is_empty()
    }
}

/// A remediation operation known to the action catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub alias: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}
