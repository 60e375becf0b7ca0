//! The notify-slack invocation: decode, format, deliver.
//!
//! An event that cannot be processed still produces a Slack message so that
//! someone notices: the raw event is sent through the default formatter with
//! a subject describing the failure, and the invocation then fails with the
//! original error. Whether that failure message got through is only logged.

use crate::config::Config;
use crate::core::DeliveryResult;
use crate::decoder;
use crate::error::NotifyError;
use crate::formatting::Formatter;
use crate::notification::SlackClientTrait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Subject used when the event has no `awslogs.data` field.
pub const UNEXPECTED_EVENT_SUBJECT: &str = "Unexpected event received!";
/// Subject used when `awslogs.data` cannot be decoded or understood.
pub const PARSE_FAILURE_SUBJECT: &str = "Slack notifier failed to parse the event!";

/// Handles one CloudWatch Logs subscription event.
pub struct NotifyHandler<S: SlackClientTrait> {
    formatter: Formatter,
    slack_client: Arc<S>,
    log_events: bool,
}

impl<S: SlackClientTrait> NotifyHandler<S> {
    /// Creates a new `NotifyHandler`.
    pub fn new(config: &Config, slack_client: Arc<S>) -> Self {
        Self {
            formatter: Formatter::new(config),
            slack_client,
            log_events: config.log_events,
        }
    }

    /// Processes a single invocation.
    ///
    /// A non-2xx answer from Slack is logged and returned as a normal result;
    /// only an unusable event or an unreachable webhook fails the invocation.
    #[instrument(skip_all)]
    pub async fn handle(&self, event: Value) -> Result<DeliveryResult, NotifyError> {
        if self.log_events {
            info!(event = %event, "Event logging enabled");
        }

        let Some(data) = event.pointer("/awslogs/data").and_then(Value::as_str) else {
            error!(event = %event, "No data found in event");
            self.notify_failure(&event, UNEXPECTED_EVENT_SUBJECT).await;
            return Err(NotifyError::MissingEnvelope);
        };

        let message = match decoder::decode(data) {
            Ok(message) => message,
            Err(e) => {
                error!(error = %e, "Error parsing event data");
                self.notify_failure(&event, PARSE_FAILURE_SUBJECT).await;
                return Err(e.into());
            }
        };
        debug!(message = %message, "Decoded log data");

        let payload = match self.formatter.format(message, None) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "Error parsing event data");
                self.notify_failure(&event, PARSE_FAILURE_SUBJECT).await;
                return Err(e.into());
            }
        };

        let result = self.slack_client.deliver(&payload).await?;
        if !result.is_success() {
            error!(
                code = result.code,
                info = %result.info,
                event = %event,
                "Error: received non-success status from Slack"
            );
        }
        Ok(result)
    }

    /// Best-effort delivery of a failure notification.
    async fn notify_failure(&self, event: &Value, subject: &str) {
        let payload = self.formatter.format_failure(event, subject);
        match self.slack_client.deliver(&payload).await {
            Ok(result) if result.is_success() => {}
            Ok(result) => {
                warn!(code = result.code, "Failure notification was rejected by Slack");
            }
            Err(e) => {
                error!(error = %e, "Failed to deliver failure notification");
            }
        }
    }
}

