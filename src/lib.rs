/// cloudwatch-notify - CloudWatch Logs error notifications for Slack
///
/// This library holds the two Lambda handlers and everything they share:
/// `notify` forwards subscription batches to a Slack webhook and `subscribe`
/// attaches an error filter to newly created log groups.
pub mod cli;
pub mod config;
pub mod core;
pub mod decoder;
pub mod error;
pub mod formatting;
pub mod logging;
pub mod notification;
pub mod notify;
pub mod rules;
pub mod services;
pub mod subscribe;

// Re-export core types for convenience
pub use crate::core::*;
