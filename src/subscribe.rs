//! The subscribe-group invocation: attach an error filter to a newly
//! created log group when the configured policy accepts it.

use crate::config::Config;
use crate::core::{SubscriptionFilter, SubscriptionRegistrar};
use crate::error::SubscribeError;
use crate::rules::SubscriptionPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

// --- Deserialization-only structs ---

/// The parts of the `CreateLogGroup` CloudTrail event we read.
#[derive(Debug, Deserialize)]
struct LogGroupCreatedEvent {
    detail: EventDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDetail {
    request_parameters: RequestParameters,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestParameters {
    log_group_name: String,
}

/// What the invocation did, returned as the Lambda response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubscribeOutcome {
    Skipped {
        log_group_name: String,
    },
    Subscribed {
        log_group_name: String,
        filter_name: String,
    },
}

/// Handles one `CreateLogGroup` event.
pub struct SubscribeHandler<R: SubscriptionRegistrar> {
    policy: SubscriptionPolicy,
    registrar: Arc<R>,
    destination_arn: Option<String>,
    log_events: bool,
}

impl<R: SubscriptionRegistrar> SubscribeHandler<R> {
    /// Creates a new `SubscribeHandler`.
    pub fn new(config: &Config, registrar: Arc<R>) -> Self {
        Self {
            policy: SubscriptionPolicy::from_config(config),
            registrar,
            destination_arn: config.target_arn.clone(),
            log_events: config.log_events,
        }
    }

    #[instrument(skip_all)]
    pub async fn handle(&self, event: Value) -> Result<SubscribeOutcome, SubscribeError> {
        if self.log_events {
            info!(event = %event, "Event logging enabled");
        }

        let event: LogGroupCreatedEvent =
            serde_json::from_value(event).map_err(SubscribeError::InvalidEvent)?;
        let log_group_name = event.detail.request_parameters.log_group_name;
        info!(log_group = %log_group_name, "New log group created");

        if !self.policy.should_subscribe(&log_group_name) {
            info!(
                log_group = %log_group_name,
                policy = self.policy.name(),
                "Skipping subscription for log group"
            );
            return Ok(SubscribeOutcome::Skipped { log_group_name });
        }

        let destination_arn = self
            .destination_arn
            .as_deref()
            .ok_or(SubscribeError::MissingDestination)?;
        let filter = SubscriptionFilter::errors_for(&log_group_name, destination_arn);

        info!(
            log_group = %log_group_name,
            filter = %filter.filter_name,
            "Subscribing new log group"
        );
        self.registrar
            .put_subscription_filter(&filter)
            .await
            .map_err(|source| SubscribeError::Registration {
                filter_name: filter.filter_name.clone(),
                source,
            })?;

        Ok(SubscribeOutcome::Subscribed {
            log_group_name,
            filter_name: filter.filter_name,
        })
    }
}
