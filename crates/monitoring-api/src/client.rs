//! Monitoring API HTTP client

use alert_delivery::{AlertId, RecipientId};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::schemas::{ActionRecord, AlertDeliveryRow, AlertRecord, MarkDeliveredRequest};
use crate::ApiConfig;

/// Client for the monitoring backend
#[derive(Debug, Clone)]
pub struct MonitoringApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
    delivery_window_secs: Option<u64>,
}

impl MonitoringApi {
    /// Create a new client
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        let base_url = config.base_url.trim_end_matches('/').to_string();

        info!("Creating monitoring API client for {}", base_url);

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
            delivery_window_secs: config.delivery_window_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Pending (alert, recipient) rows
    pub async fn get_alert_deliveries(&self) -> Result<Vec<AlertDeliveryRow>, ApiError> {
        let query: Vec<(&str, u64)> = self
            .delivery_window_secs
            .map(|age| vec![("age", age)])
            .unwrap_or_default();
        let body = self
            .send(Method::GET, "alerts/delivery", &query, None::<&()>)
            .await?;
        parse(&body)
    }

    pub async fn get_alert(&self, id: AlertId) -> Result<AlertRecord, ApiError> {
        let body = self
            .send(Method::GET, &format!("alerts/by-id/{}", id), &[], None::<&()>)
            .await?;
        parse(&body)
    }

    pub async fn get_actions(&self) -> Result<Vec<ActionRecord>, ApiError> {
        let body = self.send(Method::GET, "actions", &[], None::<&()>).await?;
        parse(&body)
    }

    /// Acknowledge delivery of an alert to the given recipients
    pub async fn mark_alert_delivered(
        &self,
        alert_id: AlertId,
        receivers: &[RecipientId],
    ) -> Result<(), ApiError> {
        let request = MarkDeliveredRequest {
            alert_id,
            receivers: receivers.to_vec(),
        };
        // the response body carries nothing we use
        self.send(Method::POST, "alerts/finish", &[], Some(&request))
            .await?;
        Ok(())
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, u64)],
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("Outgoing HTTP request: [{}] {} {:?}", method, url, query);

        let mut request = self
            .http
            .request(method, &url)
            .bearer_auth(&self.token)
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Request {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(text)
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::ResultParse(e.to_string()))
}
