//! subscribe-group - attaches an error filter to new CloudWatch log groups.

use clap::Parser;
use cloudwatch_notify::{
    cli::Cli, config::Config, logging, rules::SubscriptionPolicy,
    services::CloudWatchLogsRegistrar, subscribe::SubscribeHandler,
};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let cli = Cli::parse();

    let config = Config::load(&cli).unwrap_or_else(|err| {
        logging::init("info");
        error!("Failed to load configuration: {}", err);
        std::process::exit(1);
    });
    logging::init(&config.log_level);

    info!(
        policy = SubscriptionPolicy::from_config(&config).name(),
        exclude = ?config.exclude,
        "subscribe-group configured"
    );
    if config.target_arn.is_none() {
        warn!("TARGET_ARN is not set; accepted log groups will fail to subscribe");
    }

    let registrar = Arc::new(CloudWatchLogsRegistrar::from_env().await);
    let handler = SubscribeHandler::new(&config, registrar);

    if let Some(event) = cli.read_event()? {
        let outcome = handler.handle(event).await?;
        println!("{}", serde_json::to_string(&outcome)?);
        return Ok(());
    }

    let handler = &handler;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let outcome = handler.handle(event.payload).await?;
        Ok::<Value, Error>(serde_json::to_value(&outcome)?)
    }))
    .await
}
