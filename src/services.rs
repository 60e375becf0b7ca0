//! Encapsulation for setting up external services.

use crate::core::{SubscriptionFilter, SubscriptionRegistrar};
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_cloudwatchlogs::Client;
use tracing::{debug, instrument};

/// Registers subscription filters through the CloudWatch Logs API.
pub struct CloudWatchLogsRegistrar {
    client: Client,
}

impl CloudWatchLogsRegistrar {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the Lambda environment (region and credentials
    /// come from the default provider chain).
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_from_env().await;
        Self::new(Client::new(&sdk_config))
    }
}

#[async_trait]
impl SubscriptionRegistrar for CloudWatchLogsRegistrar {
    #[instrument(skip(self, filter), fields(log_group = %filter.log_group_name))]
    async fn put_subscription_filter(&self, filter: &SubscriptionFilter) -> Result<()> {
        self.client
            .put_subscription_filter()
            .log_group_name(&filter.log_group_name)
            .filter_name(&filter.filter_name)
            .filter_pattern(&filter.filter_pattern)
            .destination_arn(&filter.destination_arn)
            .send()
            .await
            .with_context(|| {
                format!(
                    "PutSubscriptionFilter failed for log group {}",
                    filter.log_group_name
                )
            })?;
        debug!(filter = %filter.filter_name, "Subscription filter registered");
        Ok(())
    }
}
