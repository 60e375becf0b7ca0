//! Configuration management for both handlers
//!
//! This module defines the `Config` struct holding every setting the two
//! Lambda functions read. It uses the `figment` crate to layer serialized
//! defaults, an optional TOML file, the process environment and finally
//! command-line overrides. The result is built once at process start and
//! passed by reference to the formatter, the Slack client and the
//! subscription policy.

use crate::cli::Cli;
use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Deserializer, Serialize};

/// Environment variables read into the configuration. Names are lowercased
/// by figment and map one-to-one onto `Config` fields.
const ENV_KEYS: &[&str] = &[
    "SLACK_CHANNEL",
    "SLACK_USERNAME",
    "SLACK_EMOJI",
    "SLACK_WEBHOOK_URL",
    "REGION",
    "LOG_EVENTS",
    "LOG_LEVEL",
    "EXCLUDE",
    "TARGET_ARN",
    "SUBSCRIBE_POLICY",
];

/// Which inclusion policy the subscribe-group handler applies.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Exclusion list plus an allow list of known log group prefixes.
    #[default]
    AllowListFiltered,
    /// Only skip Control Tower managed log groups.
    ControlTowerOnly,
}

/// The main configuration struct.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct Config {
    /// The logging level, used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Log every incoming event verbatim.
    #[serde(deserialize_with = "deserialize_flag")]
    pub log_events: bool,
    /// Region used for console links on formatted notifications.
    pub region: String,
    /// Slack channel the notifications are posted to.
    pub slack_channel: String,
    /// Display name of the posting bot.
    pub slack_username: String,
    /// Display icon of the posting bot, e.g. `:rotating_light:`.
    pub slack_emoji: String,
    /// The Slack incoming webhook URL.
    pub slack_webhook_url: String,
    /// Substrings that exclude a log group from auto-subscription.
    #[serde(deserialize_with = "deserialize_list")]
    pub exclude: Vec<String>,
    /// Destination ARN for new subscription filters.
    pub target_arn: Option<String>,
    /// Inclusion policy for new log groups.
    pub subscribe_policy: PolicyMode,
}

impl Config {
    /// Loads the configuration by layering defaults, the optional config
    /// file, the environment and the command line.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(path) = &cli.config {
            if !path.exists() {
                bail!("Config file not found at specified path: {}", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }

        let config: Config = figment
            // AWS_REGION is set by the Lambda runtime; REGION overrides it.
            .merge(Env::raw().only(&["AWS_REGION"]).map(|_| "region".into()))
            .merge(Env::raw().only(ENV_KEYS))
            .merge(cli.clone())
            .extract()?;
        Ok(config)
    }

    /// Checks the settings the notify-slack handler cannot run without.
    pub fn validate_for_notify(&self) -> Result<()> {
        if self.slack_webhook_url.trim().is_empty() {
            bail!("SLACK_WEBHOOK_URL must be set");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_events: false,
            region: "us-east-1".to_string(),
            slack_channel: String::new(),
            slack_username: String::new(),
            slack_emoji: String::new(),
            slack_webhook_url: String::new(),
            exclude: Vec::new(),
            target_arn: None,
            subscribe_policy: PolicyMode::default(),
        }
    }
}

/// Accepts `true`, `True`, `1`, `yes` in any form the providers hand over.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
        Flag::Text(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        ),
    })
}

/// Accepts either a list or a comma separated string. Blank entries are
/// dropped: an empty substring would match every log group.
fn deserialize_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum List {
        Many(Vec<String>),
        One(String),
    }

    let items = match List::deserialize(deserializer)? {
        List::Many(items) => items,
        List::One(s) => s.split(',').map(str::to_string).collect(),
    };
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}
