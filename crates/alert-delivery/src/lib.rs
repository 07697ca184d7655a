//! Alert Delivery
//!
//! Relays pending monitoring alerts to chat recipients:
//! - Polls a delivery source for pending (alert, recipient) pairs
//! - Throttles outbound sends to a global rate
//! - Sends suggested remediation actions alongside firing alerts
//! - Acknowledges successful sends back to the source (at-least-once)

mod config;
mod delivery_loop;
mod error;
mod model;
mod ports;
mod rate_gate;
pub mod render;

pub use config::{AckPolicy, DeliveryConfig};
pub use delivery_loop::{CycleReport, DeliveryLoop};
pub use error::{ConfigError, DeliveryError};
pub use model::{Action, AlertId, AlertStatus, Delivery, RecipientId, Severity};
pub use ports::{ActionCatalog, Button, DeliverySource, Message, NotificationSink};
pub use rate_gate::RateGate;
