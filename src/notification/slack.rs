//! A client for delivering notifications to a Slack incoming webhook.

use crate::core::{DeliveryResult, NotificationPayload};
use crate::error::DeliveryError;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use tokio::task;
use tracing::{error, info, instrument};

/// A trait for clients that can deliver a single notification.
#[async_trait]
pub trait SlackClientTrait: Send + Sync {
    /// Delivers one payload.
    ///
    /// # Returns
    /// * `Ok(DeliveryResult)` whenever the webhook answered, including non-2xx
    /// * `Err` if the request never got a response
    async fn deliver(&self, payload: &NotificationPayload)
        -> Result<DeliveryResult, DeliveryError>;
}

/// A client for posting messages to a Slack webhook.
pub struct SlackClient {
    webhook_url: String,
}

impl SlackClient {
    /// Creates a new `SlackClient`.
    pub fn new(webhook_url: String) -> Self {
        Self { webhook_url }
    }

    /// Sends the request in a blocking manner. The payload JSON travels as
    /// the single form field `payload`.
    fn send_request(webhook_url: &str, body: &str) -> Result<DeliveryResult, DeliveryError> {
        let client = reqwest::blocking::Client::builder().build()?;
        let response = client
            .post(webhook_url)
            .form(&[("payload", body)])
            .send()
            .map_err(|e| {
                error!(error = %e, "HTTP request to Slack failed");
                e
            })?;

        let status = response.status();
        let info = render_headers(response.headers());
        if status.is_success() {
            info!(status = %status, "Successfully sent notification to Slack.");
        } else {
            let text = response.text().unwrap_or_default();
            error!(
                status = %status,
                body = %text,
                "Failed to send Slack notification"
            );
        }

        Ok(DeliveryResult {
            code: status.as_u16(),
            info,
        })
    }
}

#[async_trait]
impl SlackClientTrait for SlackClient {
    #[instrument(skip(self, payload))]
    async fn deliver(
        &self,
        payload: &NotificationPayload,
    ) -> Result<DeliveryResult, DeliveryError> {
        let body = payload.to_json()?;
        let webhook_url = self.webhook_url.clone();

        task::spawn_blocking(move || Self::send_request(&webhook_url, &body))
            .await
            .map_err(|e| {
                error!(error = %e, "Slack notification task failed");
                DeliveryError::Task(e)
            })?
    }
}

/// One `name: value` line per header.
fn render_headers(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(name, value)| {
            format!("{}: {}", name, value.to_str().unwrap_or("<non-ascii>"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
