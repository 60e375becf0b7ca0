//! A mock Slack client that records payloads and answers with a fixed code.

use async_trait::async_trait;
use cloudwatch_notify::core::{DeliveryResult, NotificationPayload};
use cloudwatch_notify::error::DeliveryError;
use cloudwatch_notify::notification::SlackClientTrait;
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug)]
pub struct MockSlackClient {
    pub sent: Arc<Mutex<Vec<NotificationPayload>>>,
    pub code: u16,
}

impl Default for MockSlackClient {
    fn default() -> Self {
        Self::answering(200)
    }
}

impl MockSlackClient {
    pub fn answering(code: u16) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            code,
        }
    }

    pub fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SlackClientTrait for MockSlackClient {
    async fn deliver(&self, payload: &NotificationPayload) -> Result<DeliveryResult, DeliveryError> {
        self.sent.lock().unwrap().push(payload.clone());
        Ok(DeliveryResult {
            code: self.code,
            info: String::new(),
        })
    }
}
