//! End-to-end tests of the notify-slack handler against a mock webhook.

use anyhow::Result;
use cloudwatch_notify::{
    config::Config,
    error::NotifyError,
    notification::SlackClient,
    notify::{NotifyHandler, PARSE_FAILURE_SUBJECT, UNEXPECTED_EVENT_SUBJECT},
};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::{awslogs_event, log_filter_batch};

async fn start_webhook(status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/T000/B000/XXXX"))
        .respond_with(ResponseTemplate::new(status))
        .mount(&server)
        .await;
    server
}

fn handler_for(server: &MockServer) -> NotifyHandler<SlackClient> {
    let config = Config {
        slack_channel: "#ops-alerts".to_string(),
        slack_username: "cloudwatch".to_string(),
        slack_emoji: ":rotating_light:".to_string(),
        slack_webhook_url: format!("{}/services/T000/B000/XXXX", server.uri()),
        region: "us-west-2".to_string(),
        ..Default::default()
    };
    let client = Arc::new(SlackClient::new(config.slack_webhook_url.clone()));
    NotifyHandler::new(&config, client)
}

/// Decodes the JSON carried in the `payload` form field of every request.
async fn delivered_payloads(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| {
            let (_, payload) = url::form_urlencoded::parse(&request.body)
                .find(|(key, _)| key == "payload")
                .expect("request has no payload field");
            serde_json::from_str(&payload).unwrap()
        })
        .collect()
}

#[tokio::test]
async fn test_log_filter_event_is_delivered() -> Result<()> {
    let server = start_webhook(200).await;
    let handler = handler_for(&server);

    let result = handler
        .handle(awslogs_event(&log_filter_batch("/aws/lambda/foo", "boom")))
        .await?;
    assert_eq!(result.code, 200);

    let payloads = delivered_payloads(&server).await;
    assert_eq!(payloads.len(), 1);
    let payload = &payloads[0];
    assert_eq!(payload["channel"], "#ops-alerts");
    assert_eq!(payload["username"], "cloudwatch");
    assert_eq!(payload["icon_emoji"], ":rotating_light:");

    let attachments = payload["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    let attachment = &attachments[0];
    assert_eq!(attachment["color"], "danger");
    assert_eq!(attachment["title"], "Error in CloudWatch logGroup /aws/lambda/foo");

    let fields = attachment["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 7);
    assert_eq!(fields[3]["value"], "`2024/05/01/[$LATEST]0123456789abcdef`");
    assert_eq!(fields[4]["value"], "`boom`");
    assert_eq!(fields[6]["value"], "us-west-2");
    assert!(fields[2]["value"]
        .as_str()
        .unwrap()
        .starts_with("https://us-west-2.console.aws.amazon.com/"));

    Ok(())
}

#[tokio::test]
async fn test_missing_envelope_notifies_and_fails() {
    let server = start_webhook(200).await;
    let handler = handler_for(&server);

    let result = handler.handle(json!({ "Records": [] })).await;

    assert!(matches!(result, Err(NotifyError::MissingEnvelope)));
    let payloads = delivered_payloads(&server).await;
    assert_eq!(payloads.len(), 1);
    let attachment = &payloads[0]["attachments"][0];
    assert_eq!(attachment["title"], UNEXPECTED_EVENT_SUBJECT);
    assert_eq!(attachment["fields"][0]["title"], "Records");
    assert_eq!(attachment["fields"][0]["value"], "`[]`");
}

#[tokio::test]
async fn test_corrupt_payload_notifies_and_fails() {
    let server = start_webhook(200).await;
    let handler = handler_for(&server);

    let result = handler
        .handle(json!({ "awslogs": { "data": "H4sIAAAAAAAA/corrupt" } }))
        .await;

    assert!(matches!(result, Err(NotifyError::Decode(_))));
    let payloads = delivered_payloads(&server).await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["attachments"][0]["title"], PARSE_FAILURE_SUBJECT);
}

#[tokio::test]
async fn test_malformed_batch_notifies_and_fails() {
    let server = start_webhook(200).await;
    let handler = handler_for(&server);
    let batch = json!({ "logGroup": "/aws/lambda/foo", "logEvents": [] });

    let result = handler.handle(awslogs_event(&batch)).await;

    assert!(matches!(result, Err(NotifyError::Shape(_))));
    let payloads = delivered_payloads(&server).await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["attachments"][0]["title"], PARSE_FAILURE_SUBJECT);
}

#[tokio::test]
async fn test_rejected_delivery_does_not_fail_invocation() -> Result<()> {
    let server = start_webhook(404).await;
    let handler = handler_for(&server);

    let result = handler
        .handle(awslogs_event(&log_filter_batch("/aws/lambda/foo", "boom")))
        .await?;

    assert_eq!(result.code, 404);
    assert!(!result.is_success());
    assert_eq!(delivered_payloads(&server).await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_preformatted_message_is_posted_as_is() -> Result<()> {
    let server = start_webhook(200).await;
    let handler = handler_for(&server);
    let message = json!({ "text": "deploy finished", "channel": "#deploys" });

    handler.handle(awslogs_event(&message)).await?;

    let payloads = delivered_payloads(&server).await;
    assert_eq!(payloads[0]["channel"], "#deploys");
    assert_eq!(payloads[0]["username"], "cloudwatch");
    assert_eq!(payloads[0]["text"], "deploy finished");
    assert!(payloads[0].get("attachments").is_none());
    Ok(())
}

#[tokio::test]
async fn test_unreachable_webhook_fails_invocation() {
    let config = Config {
        slack_webhook_url: "http://127.0.0.1:1/hook".to_string(),
        ..Default::default()
    };
    let client = Arc::new(SlackClient::new(config.slack_webhook_url.clone()));
    let handler = NotifyHandler::new(&config, client);

    let result = handler
        .handle(awslogs_event(&log_filter_batch("/aws/lambda/foo", "boom")))
        .await;

    assert!(matches!(result, Err(NotifyError::Delivery(_))));
}
