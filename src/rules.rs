//! Inclusion policies for auto-subscribing new log groups.
//!
//! Two strategies are deployed side by side and neither supersedes the
//! other, so the one in effect is picked by configuration.

use crate::config::{Config, PolicyMode};

/// Log group prefixes accepted by the allow list, lowercase.
const LAMBDA_PREFIX: &str = "/aws/lambda/";
const API_GATEWAY_PREFIX: &str = "api-gateway-execution-logs";
const BEANSTALK_PREFIX: &str = "/aws/elasticbeanstalk";
/// Only the service logs of a Beanstalk environment, not its host logs.
const BEANSTALK_CONTAINERS: &str = "/containers/";

/// Decides whether a newly created log group gets an error filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionPolicy {
    /// Rejects excluded and `dev` groups, then accepts only known prefixes.
    AllowListFiltered { exclude: Vec<String> },
    /// Accepts everything except Control Tower managed groups.
    ControlTowerOnly,
}

impl SubscriptionPolicy {
    pub fn from_config(config: &Config) -> Self {
        match config.subscribe_policy {
            PolicyMode::AllowListFiltered => Self::AllowListFiltered {
                exclude: config.exclude.clone(),
            },
            PolicyMode::ControlTowerOnly => Self::ControlTowerOnly,
        }
    }

    /// Applies the policy to `log_group_name`. Matching ignores case.
    ///
    /// The exclusion list must name the notifier's own log group, otherwise
    /// its error lines would be forwarded back to it in a loop.
    pub fn should_subscribe(&self, log_group_name: &str) -> bool {
        let log_group_name = log_group_name.to_lowercase();
        match self {
            Self::AllowListFiltered { exclude } => {
                if exclude
                    .iter()
                    .any(|item| log_group_name.contains(&item.to_lowercase()))
                {
                    return false;
                }
                if log_group_name.contains("dev") {
                    return false;
                }
                log_group_name.starts_with(LAMBDA_PREFIX)
                    || log_group_name.starts_with(API_GATEWAY_PREFIX)
                    || (log_group_name.starts_with(BEANSTALK_PREFIX)
                        && log_group_name.contains(BEANSTALK_CONTAINERS))
            }
            Self::ControlTowerOnly => !log_group_name.contains("controltower"),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AllowListFiltered { .. } => "allow_list_filtered",
            Self::ControlTowerOnly => "control_tower_only",
        }
    }
}
