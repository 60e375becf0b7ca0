//! Command-Line Interface (CLI) argument parsing.
//!
//! Both binaries share these arguments. Inside Lambda they are normally
//! absent and the process starts the runtime loop. Passing `--event` runs a
//! single local invocation against a JSON event file instead, which is the
//! easiest way to debug a formatter or policy change.

use clap::Parser;
use figment::{
    value::{Dict, Map, Value},
    Error, Metadata, Profile, Provider,
};
use std::path::PathBuf;

/// CloudWatch Logs to Slack notification handlers.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to an optional TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run the handler once against this JSON event instead of serving Lambda.
    #[arg(short, long, value_name = "FILE")]
    pub event: Option<PathBuf>,

    /// Region used for console links.
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Reads and parses the local event file, if one was given.
    pub fn read_event(&self) -> anyhow::Result<Option<serde_json::Value>> {
        let Some(path) = &self.event else {
            return Ok(None);
        };
        let raw = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read event file {}: {}", path.display(), e)
        })?;
        let event = serde_json::from_str(&raw).map_err(|e| {
            anyhow::anyhow!("Failed to parse event file {}: {}", path.display(), e)
        })?;
        Ok(Some(event))
    }
}

impl Provider for Cli {
    fn metadata(&self) -> Metadata {
        Metadata::named("Command-Line Arguments")
    }

    fn data(&self) -> Result<Map<Profile, Dict>, Error> {
        let mut dict = Dict::new();

        if let Some(region) = &self.region {
            dict.insert("region".into(), Value::from(region.clone()));
        }

        if let Some(level) = &self.log_level {
            dict.insert("log_level".into(), Value::from(level.clone()));
        }

        let mut map = Map::new();
        map.insert(Profile::Default, dict);
        Ok(map)
    }
}
