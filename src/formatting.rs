//! Classification of inbound messages and their rendering as Slack payloads.
//!
//! Every message goes through a single classification step that yields a
//! [`Classified`] variant. The variants are checked in a fixed order:
//! CloudWatch Logs filter batches first, then messages that already look
//! like a Slack payload, then anything else through the default formatter.

use crate::config::Config;
use crate::core::{Attachment, Body, Field, LogFilterEvent, NotificationPayload};
use crate::error::ShapeError;
use serde_json::{Map, Value};
use tracing::{info, warn};
use url::form_urlencoded;

/// Rendered values shorter than this many characters are displayed as
/// short fields.
const SHORT_FIELD_LIMIT: usize = 25;

/// The shape of an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// A decoded CloudWatch Logs subscription batch.
    LogFilterEvent(LogFilterEvent),
    /// A mapping with `attachments` or `text`, posted as-is.
    Preformatted(Map<String, Value>),
    /// Any other mapping.
    GenericMapping(Map<String, Value>),
    /// Text that is not a JSON object.
    PlainString(String),
}

/// Works out which formatting strategy applies to `message`.
///
/// Strings are parsed as JSON first; text that does not parse to an object
/// is kept as a plain string. Only a mapping that claims to be a log filter
/// batch (has `logEvents`) but does not have its shape is an error.
pub fn classify(message: Value) -> Result<Classified, ShapeError> {
    let message = match message {
        Value::String(text) => match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Value::Object(map),
            _ => {
                info!("Not a structured payload, just a string message");
                return Ok(Classified::PlainString(text));
            }
        },
        other => other,
    };

    match message {
        Value::Object(map) if map.contains_key("logEvents") => {
            let event: LogFilterEvent =
                serde_json::from_value(Value::Object(map)).map_err(ShapeError::Malformed)?;
            if event.log_events.is_empty() {
                return Err(ShapeError::NoLogEvents(event.log_group));
            }
            Ok(Classified::LogFilterEvent(event))
        }
        Value::Object(map) if map.contains_key("attachments") || map.contains_key("text") => {
            Ok(Classified::Preformatted(map))
        }
        Value::Object(map) => Ok(Classified::GenericMapping(map)),
        other => Ok(Classified::PlainString(other.to_string())),
    }
}

/// Builds Slack payloads carrying the configured channel and identity.
#[derive(Debug, Clone)]
pub struct Formatter {
    channel: String,
    username: String,
    icon_emoji: String,
    region: String,
}

impl Formatter {
    pub fn new(config: &Config) -> Self {
        Self {
            channel: config.slack_channel.clone(),
            username: config.slack_username.clone(),
            icon_emoji: config.slack_emoji.clone(),
            region: config.region.clone(),
        }
    }

    /// Formats `message` into a payload. `subject` only titles messages
    /// that go through the default formatter.
    pub fn format(
        &self,
        message: Value,
        subject: Option<&str>,
    ) -> Result<NotificationPayload, ShapeError> {
        let body = match classify(message)? {
            Classified::LogFilterEvent(event) => {
                Body::Attachment(format_log_filter_event(&event, &self.region))
            }
            Classified::Preformatted(message) => Body::Preformatted(message),
            Classified::GenericMapping(map) => Body::Attachment(format_default(
                subject,
                mapping_fields(&map),
            )),
            Classified::PlainString(text) => {
                Body::Attachment(format_default(subject, vec![text_field(text)]))
            }
        };
        Ok(self.payload(body))
    }

    /// Formats an event that could not be processed. Never fails: an event
    /// that trips the log filter shape check is rendered by the default
    /// formatter instead.
    pub fn format_failure(&self, event: &Value, subject: &str) -> NotificationPayload {
        match self.format(event.clone(), Some(subject)) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Falling back to the default formatter for failure notification");
                let fields = match event {
                    Value::Object(map) => mapping_fields(map),
                    other => vec![text_field(other.to_string())],
                };
                self.payload(Body::Attachment(format_default(Some(subject), fields)))
            }
        }
    }

    fn payload(&self, body: Body) -> NotificationPayload {
        NotificationPayload {
            channel: self.channel.clone(),
            username: self.username.clone(),
            icon_emoji: self.icon_emoji.clone(),
            body,
        }
    }
}

/// Renders a CloudWatch Logs batch. Only the first log event is shown and
/// the field order is fixed.
fn format_log_filter_event(event: &LogFilterEvent, region: &str) -> Attachment {
    let title = format!("Error in CloudWatch logGroup {}", event.log_group);
    let first = &event.log_events[0];
    let url = console_url(region, &event.log_group, &event.log_stream);

    Attachment {
        color: Some("danger".to_string()),
        title: Some(title.clone()),
        text: None,
        fallback: title,
        mrkdwn_in: Vec::new(),
        fields: vec![
            Field::new("CloudWatch logGroup error", backticked(&event.log_group), true),
            Field::new("Log Group", backticked(&event.log_group), false),
            Field::new("URL", url, false),
            Field::new("Log Stream", backticked(&event.log_stream), false),
            Field::new("Message", backticked(&first.message), true),
            Field::new("AWS Account", backticked(&event.owner), true),
            Field::new("AWS Region", region, true),
        ],
    }
}

/// Deep link to a log stream in the CloudWatch console.
pub fn console_url(region: &str, log_group: &str, log_stream: &str) -> String {
    format!(
        "https://{region}.console.aws.amazon.com/cloudwatch/home?region={region}#logsV2:log-groups/log-group/{}/log-events/{}",
        encode_component(log_group),
        encode_component(log_stream),
    )
}

/// Form-style percent encoding: `/` becomes `%2F` and space becomes `+`.
fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn format_default(subject: Option<&str>, fields: Vec<Field>) -> Attachment {
    Attachment {
        color: None,
        title: Some(subject.unwrap_or("Message").to_string()),
        text: Some("AWS notification".to_string()),
        fallback: "A new message".to_string(),
        mrkdwn_in: vec!["value".to_string()],
        fields,
    }
}

fn mapping_fields(map: &Map<String, Value>) -> Vec<Field> {
    map.iter()
        .map(|(key, value)| {
            let rendered = render_value(value);
            let short = rendered.chars().count() < SHORT_FIELD_LIMIT;
            Field::new(key, backticked(&rendered), short)
        })
        .collect()
}

fn text_field(text: String) -> Field {
    Field {
        title: None,
        value: text,
        short: false,
    }
}

/// Strings are shown unquoted; everything else as compact JSON.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn backticked(value: &str) -> String {
    format!("`{}`", value)
}
