//! Collaborator seams of the delivery loop

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DeliveryError;
use crate::model::{Action, AlertId, Delivery, RecipientId};

/// Rendered notification ready to hand to a sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// HTML-formatted body
    pub text: String,
    /// Inline buttons, one per row
    #[serde(default)]
    pub buttons: Vec<Button>,
}

impl Message {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }
}

/// Inline button attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub text: String,
    pub callback_data: String,
}

/// Source of truth for pending deliveries
#[async_trait]
pub trait DeliverySource: Send + Sync {
    /// Deliveries not yet acknowledged, in source order
    async fn list_pending(&self) -> Result<Vec<Delivery>, DeliveryError>;

    /// Acknowledge delivery of an alert to the given recipients. Idempotent.
    async fn mark_delivered(
        &self,
        alert_id: AlertId,
        recipients: &[RecipientId],
    ) -> Result<(), DeliveryError>;
}

/// Catalog of known remediation actions
#[async_trait]
pub trait ActionCatalog: Send + Sync {
    async fn actions(&self) -> Result<Vec<Action>, DeliveryError>;
}

/// Outbound chat channel. Must be safe for concurrent use.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, recipient: RecipientId, message: &Message) -> Result<(), DeliveryError>;
}
