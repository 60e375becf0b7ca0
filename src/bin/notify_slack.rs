//! notify-slack - forwards CloudWatch Logs subscription events to Slack.

use clap::Parser;
use cloudwatch_notify::{
    cli::Cli, config::Config, logging, notification::SlackClient, notify::NotifyHandler,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    let config = Config::load(&cli).unwrap_or_else(|err| {
        logging::init("info");
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });
    logging::init(&config.log_level);
    config.validate_for_notify()?;

    info!(
        channel = %config.slack_channel,
        region = %config.region,
        log_events = config.log_events,
        "notify-slack configured"
    );

    let slack_client = Arc::new(SlackClient::new(config.slack_webhook_url.clone()));
    let handler = NotifyHandler::new(&config, slack_client);

    if let Some(event) = cli.read_event()? {
        let result = handler.handle(event).await?;
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }

    let handler = &handler;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let result = handler.handle(event.payload).await?;
        Ok::<String, Error>(serde_json::to_string(&result)?)
    }))
    .await
}
