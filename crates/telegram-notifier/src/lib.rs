//! Telegram Notification Sink
//!
//! Sends rendered alert messages through the Telegram Bot API using HTML
//! parse mode, with inline keyboards for action buttons.

use alert_delivery::{DeliveryError, Message, NotificationSink, RecipientId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

mod wire;

use wire::{ApiResponse, InlineButton, InlineKeyboard, SendMessageRequest, User};

/// Telegram errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Telegram API error {code}: {description}")]
    Api {
        code: u16,
        description: String,
        /// Seconds to wait before retrying, when flood control kicked in
        retry_after: Option<u64>,
    },

    #[error("Unexpected Telegram response: {0}")]
    Decode(String),
}

impl NotifyError {
    pub fn is_retryable(&self) -> bool {
        match self {
            NotifyError::Transport(_) => true,
            NotifyError::Api { code, .. } => *code == 429 || *code >= 500,
            NotifyError::Decode(_) => false,
        }
    }
}

impl From<NotifyError> for DeliveryError {
    fn from(err: NotifyError) -> Self {
        match err {
            NotifyError::Transport(e) => DeliveryError::Transport(e.to_string()),
            NotifyError::Api {
                code, description, ..
            } => DeliveryError::Rejected {
                status: code,
                message: description,
            },
            NotifyError::Decode(msg) => DeliveryError::Validation(msg),
        }
    }
}

/// Telegram Bot API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    pub token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Per-request timeout (milliseconds)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Bot API client. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    http: reqwest::Client,
    /// `<api_url>/bot<token>`, never logged
    endpoint: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let api_url = config.api_url.trim_end_matches('/');

        info!("Creating Telegram notifier against {}", api_url);

        Ok(Self {
            http,
            endpoint: format!("{}/bot{}", api_url, config.token),
        })
    }

    /// Username of the bot; doubles as a token check
    pub async fn get_me(&self) -> Result<String, NotifyError> {
        let me: User = self.call("getMe", &serde_json::json!({})).await?;
        me.username
            .ok_or_else(|| NotifyError::Decode("getMe returned no username".to_string()))
    }

    /// Send `message` to a chat
    pub async fn send_message(&self, chat_id: i64, message: &Message) -> Result<(), NotifyError> {
        let reply_markup = (!message.buttons.is_empty()).then(|| InlineKeyboard {
            inline_keyboard: message
                .buttons
                .iter()
                .map(|button| {
                    vec![InlineButton {
                        text: &button.text,
                        callback_data: &button.callback_data,
                    }]
                })
                .collect(),
        });
        let request = SendMessageRequest {
            chat_id,
            text: &message.text,
            parse_mode: "HTML",
            reply_markup,
        };

        debug!("Sending message to chat {}", chat_id);
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, NotifyError>
    where
        B: Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}/{}", self.endpoint, method))
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        let parsed: ApiResponse<T> = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(NotifyError::Api {
                    code: status.as_u16(),
                    description: text,
                    retry_after: None,
                })
            }
            Err(e) => return Err(NotifyError::Decode(e.to_string())),
        };

        parsed.into_result(status.as_u16())
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn send(&self, recipient: RecipientId, message: &Message) -> Result<(), DeliveryError> {
        self.send_message(recipient.0, message).await?;
        Ok(())
    }
}
