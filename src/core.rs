//! Core domain types and service traits
//!
//! This module defines the data that flows through both handlers (decoded
//! log records, Slack payloads, delivery results, subscription filters) and
//! the trait contract for the one external call the subscribe handler makes.

use anyhow::Result;
use async_trait::async_trait;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

// =============================================================================
// Inbound records
// =============================================================================

/// A batch of filtered log records as delivered by a CloudWatch Logs
/// subscription, after decompression.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogFilterEvent {
    /// Account that owns the log group
    pub owner: String,
    pub log_group: String,
    pub log_stream: String,
    /// Matching records, oldest first
    pub log_events: Vec<LogEvent>,
}

/// A single log line that matched the subscription filter.
///
/// Only `message` is read. Other keys such as `id` and `timestamp` are
/// ignored whatever their JSON type.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LogEvent {
    pub message: String,
}

// =============================================================================
// Outbound Slack payload
// =============================================================================

/// A Slack message ready to be posted to an incoming webhook.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationPayload {
    pub channel: String,
    pub username: String,
    pub icon_emoji: String,
    pub body: Body,
}

/// What the message carries besides the configured identity.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// A single attachment built by the formatter.
    Attachment(Attachment),
    /// A message that already looks like a Slack payload. Its keys are
    /// merged over the configured identity.
    Preformatted(Map<String, Value>),
}

impl NotificationPayload {
    /// The formatter-built attachment, if this payload has one.
    pub fn attachment(&self) -> Option<&Attachment> {
        match &self.body {
            Body::Attachment(attachment) => Some(attachment),
            Body::Preformatted(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl Serialize for NotificationPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let identity = [
            ("channel", &self.channel),
            ("username", &self.username),
            ("icon_emoji", &self.icon_emoji),
        ];

        let mut map = serializer.serialize_map(None)?;
        match &self.body {
            Body::Attachment(attachment) => {
                for (key, value) in identity {
                    map.serialize_entry(key, value)?;
                }
                map.serialize_entry("attachments", std::slice::from_ref(attachment))?;
            }
            Body::Preformatted(message) => {
                // Identity keys keep their slot; the message may override the value.
                for (key, value) in identity {
                    match message.get(key) {
                        Some(overridden) => map.serialize_entry(key, overridden)?,
                        None => map.serialize_entry(key, value)?,
                    }
                }
                for (key, value) in message {
                    if !identity.iter().any(|(name, _)| *name == key.as_str()) {
                        map.serialize_entry(key, value)?;
                    }
                }
            }
        }
        map.end()
    }
}

/// A Slack attachment block.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Plain-text summary for clients that cannot render attachments
    pub fallback: String,
    /// Attachment parts rendered as markdown
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mrkdwn_in: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

/// One labelled value inside an attachment.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Field {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub value: String,
    /// Render next to sibling fields instead of full width
    pub short: bool,
}

impl Field {
    pub fn new(title: &str, value: impl Into<String>, short: bool) -> Self {
        Self {
            title: Some(title.to_string()),
            value: value.into(),
            short,
        }
    }
}

/// Outcome of a webhook POST that reached the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryResult {
    /// HTTP status code
    pub code: u16,
    /// Response headers, one `name: value` per line
    pub info: String,
}

impl DeliveryResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }
}

// =============================================================================
// Subscription filters
// =============================================================================

/// Pattern selecting log lines that mention an error, exception or failure.
pub const ERROR_FILTER_PATTERN: &str =
    "?error ?Error ?ERROR ?Exception ?exception ?EXCEPTION ?fail ?Fail ?FAIL ?FATAL";

/// A subscription filter to register on a newly created log group.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub log_group_name: String,
    pub filter_name: String,
    pub filter_pattern: String,
    pub destination_arn: String,
}

impl SubscriptionFilter {
    /// The error filter for `log_group_name`, forwarding to `destination_arn`.
    pub fn errors_for(log_group_name: &str, destination_arn: &str) -> Self {
        Self {
            log_group_name: log_group_name.to_string(),
            filter_name: format!("{}-errors-filter", log_group_name),
            filter_pattern: ERROR_FILTER_PATTERN.to_string(),
            destination_arn: destination_arn.to_string(),
        }
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// Registers subscription filters with CloudWatch Logs.
#[async_trait]
pub trait SubscriptionRegistrar: Send + Sync {
    /// Creates or replaces the given subscription filter.
    ///
    /// # Returns
    /// * `Ok(())` once the filter is registered
    /// * `Err` for any API or transport failure
    async fn put_subscription_filter(&self, filter: &SubscriptionFilter) -> Result<()>;
}
