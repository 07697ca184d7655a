//! Bot API request and response shapes

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::NotifyError;

#[derive(Debug, Serialize)]
pub(crate) struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub parse_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboard<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineKeyboard<'a> {
    pub inline_keyboard: Vec<Vec<InlineButton<'a>>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct InlineButton<'a> {
    pub text: &'a str,
    pub callback_data: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct User {
    #[allow(dead_code)]
    pub id: i64,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResponseParameters {
    #[serde(default)]
    pub retry_after: Option<u64>,
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<u16>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// `http_status` stands in for a missing `error_code`
    pub fn into_result(self, http_status: u16) -> Result<T, NotifyError> {
        if !self.ok {
            return Err(NotifyError::Api {
                code: self.error_code.unwrap_or(http_status),
                description: self.description.unwrap_or_default(),
                retry_after: self.parameters.and_then(|p| p.retry_after),
            });
        }
        self.result
            .ok_or_else(|| NotifyError::Decode("ok response without result".to_string()))
    }
}
