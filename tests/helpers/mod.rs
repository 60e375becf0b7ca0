#![allow(dead_code)]
//! Fixtures shared by the integration tests.

pub mod mock_slack;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use flate2::{write::GzEncoder, Compression};
use serde_json::{json, Value};
use std::io::Write;

/// Compresses and encodes `message` the way CloudWatch Logs does for
/// subscription deliveries.
pub fn encode_awslogs_data(message: &Value) -> String {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(message.to_string().as_bytes()).unwrap();
    STANDARD.encode(encoder.finish().unwrap())
}

/// Wraps `message` in a Lambda trigger envelope.
pub fn awslogs_event(message: &Value) -> Value {
    json!({ "awslogs": { "data": encode_awslogs_data(message) } })
}

/// A decoded subscription batch with a single record.
pub fn log_filter_batch(log_group: &str, message: &str) -> Value {
    json!({
        "messageType": "DATA_MESSAGE",
        "owner": "123456789012",
        "logGroup": log_group,
        "logStream": "2024/05/01/[$LATEST]0123456789abcdef",
        "subscriptionFilters": [format!("{}-errors-filter", log_group)],
        "logEvents": [
            { "id": "37", "timestamp": 1714521600000i64, "message": message }
        ]
    })
}

/// A `CreateLogGroup` event as delivered by EventBridge.
pub fn log_group_created(name: &str) -> Value {
    json!({
        "version": "0",
        "source": "aws.logs",
        "detail-type": "AWS API Call via CloudTrail",
        "detail": {
            "eventSource": "logs.amazonaws.com",
            "eventName": "CreateLogGroup",
            "requestParameters": { "logGroupName": name }
        }
    })
}
