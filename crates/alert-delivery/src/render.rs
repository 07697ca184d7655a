//! Notification rendering
//!
//! Turns deliveries and actions into HTML chat messages.

use chrono::SecondsFormat;

use crate::model::{Action, AlertStatus, Delivery, Severity};
use crate::ports::{Button, Message};

/// Heading of the follow-up message listing suggested actions
pub const SUGGESTED_ACTIONS_HEADING: &str = "Suggested actions:";

/// Prefix of the callback data carried by action buttons
pub const ACTION_CALLBACK_PREFIX: &str = "action:";

/// Escape text for HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Render the primary alert notification
pub fn render_alert(delivery: &Delivery) -> Message {
    let title = escape_html(&delivery.title);
    let mut lines = Vec::with_capacity(5);

    if delivery.status == AlertStatus::Resolved {
        lines.push(format!("Resolved: <b>{}</b> ✅", title));
    } else {
        let emoji = match delivery.severity {
            Severity::Warning => "⚠️",
            Severity::Critical => "🚨",
        };
        lines.push(format!("{emoji} <b>{title}</b> {emoji}"));
    }

    lines.push(String::new());
    lines.push(format!(
        "Time: {}",
        delivery.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    ));

    if !delivery.description.is_empty() {
        lines.push(String::new());
        lines.push(escape_html(&delivery.description));
    }

    Message::text(lines.join("\n"))
}

/// Render the "suggested actions" follow-up with one button per action
pub fn render_suggested_actions(actions: &[Action]) -> Message {
    Message {
        text: SUGGESTED_ACTIONS_HEADING.to_string(),
        buttons: actions
            .iter()
            .map(|action| Button {
                text: action.title.clone(),
                callback_data: format!("{}{}", ACTION_CALLBACK_PREFIX, action.alias),
            })
            .collect(),
    }
}

/// Catalog entries whose alias is among `aliases`, in catalog order
pub fn suggested(catalog: Vec<Action>, aliases: &[String]) -> Vec<Action> {
    catalog
        .into_iter()
        .filter(|action| aliases.iter().any(|alias| alias == &action.alias))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AlertId, RecipientId};
    use chrono::{TimeZone, Utc};

    fn delivery(status: AlertStatus, severity: Severity) -> Delivery {
        Delivery {
            alert_id: AlertId(7),
            recipients: vec![RecipientId(1)],
            status,
            severity,
            title: "Replication lag > 10s".to_string(),
            description: "Replica <db-2> is behind".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap(),
            suggested_actions: vec![],
        }
    }

    fn action(alias: &str) -> Action {
        Action {
            alias: alias.to_string(),
            title: format!("Run {alias}"),
            description: None,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && \"c\" > d"), "a &lt; b &amp;&amp; &quot;c&quot; &gt; d");
    }

    #[test]
    fn test_render_firing_alert() {
        let message = render_alert(&delivery(AlertStatus::Fired, Severity::Critical));
        assert_eq!(
            message.text,
            "🚨 <b>Replication lag &gt; 10s</b> 🚨\n\nTime: 2024-03-01T12:30:00.000Z\n\nReplica &lt;db-2&gt; is behind"
        );
        assert!(message.buttons.is_empty());
    }

    #[test]
    fn test_render_resolved_alert_without_description() {
        let mut resolved = delivery(AlertStatus::Resolved, Severity::Warning);
        resolved.description.clear();
        let message = render_alert(&resolved);
        assert_eq!(
            message.text,
            "Resolved: <b>Replication lag &gt; 10s</b> ✅\n\nTime: 2024-03-01T12:30:00.000Z"
        );
    }

    #[test]
    fn test_render_warning_uses_warning_emoji() {
        let message = render_alert(&delivery(AlertStatus::Fired, Severity::Warning));
        assert!(message.text.starts_with("⚠️ <b>"));
    }

    #[test]
    fn test_suggested_keeps_catalog_order() {
        let catalog = vec![action("vacuum"), action("restart"), action("kill-idle")];
        let aliases = vec!["kill-idle".to_string(), "vacuum".to_string(), "missing".to_string()];

        let picked = suggested(catalog, &aliases);
        let picked: Vec<_> = picked.iter().map(|a| a.alias.as_str()).collect();
        assert_eq!(picked, vec!["vacuum", "kill-idle"]);
    }

    #[test]
    fn test_render_suggested_actions_buttons() {
        let message = render_suggested_actions(&[action("vacuum")]);
        assert_eq!(message.text, SUGGESTED_ACTIONS_HEADING);
        assert_eq!(
            message.buttons,
            vec![Button {
                text: "Run vacuum".to_string(),
                callback_data: "action:vacuum".to_string(),
            }]
        );
    }
}
