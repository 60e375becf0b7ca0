//! Error types shared by both handlers.

use thiserror::Error;

/// Failure to turn the compressed `awslogs.data` field back into JSON.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not a valid gzip stream: {0}")]
    Gzip(#[source] std::io::Error),

    #[error("decompressed payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("decompressed payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A message that carries `logEvents` but does not look like a
/// CloudWatch Logs subscription record.
#[derive(Debug, Error)]
pub enum ShapeError {
    #[error("malformed log filter event: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("log filter event for `{0}` has no log events")]
    NoLogEvents(String),
}

/// Failure to reach the webhook at all.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to serialize notification payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("HTTP request to Slack failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Slack delivery task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Terminal failures of the notify-slack invocation.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("No data found in event")]
    MissingEnvelope,

    #[error("Error parsing event data: {0}")]
    Decode(#[from] DecodeError),

    #[error("Error parsing event data: {0}")]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Terminal failures of the subscribe-group invocation.
#[derive(Debug, Error)]
pub enum SubscribeError {
    #[error("event does not carry detail.requestParameters.logGroupName: {0}")]
    InvalidEvent(#[source] serde_json::Error),

    #[error("no subscription destination configured (TARGET_ARN)")]
    MissingDestination,

    #[error("failed to register subscription filter `{filter_name}`: {source}")]
    Registration {
        filter_name: String,
        #[source]
        source: anyhow::Error,
    },
}
