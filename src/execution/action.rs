use serde::Deserialize;

use crate::config::DeployConfig;
use crate::error::{Error, Result};

/// The requested operation: perform a deployment or only check for updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeployAction {
    #[default]
    Deploy,
    Check,
}

/// JSON body of a deploy request. Both fields are optional.
#[derive(Debug, Deserialize)]
struct DeployRequestBody {
    action: Option<String>,
    source: Option<String>,
}

impl DeployAction {
    /// Derive the action from the raw request body.
    ///
    /// An empty or non-JSON body defaults to `deploy`; only a present but
    /// unrecognized `action` field is an error. Returns the action and the
    /// caller-supplied `source` label used for logging.
    pub fn from_body(body: &[u8]) -> Result<(Self, String)> {
        if body.is_empty() {
            return Ok((Self::Deploy, "unknown".to_string()));
        }

        let parsed: DeployRequestBody = match serde_json::from_slice(body) {
            Ok(parsed) => parsed,
            // Malformed payloads are treated as empty, not rejected
            Err(_) => {
                return Ok((Self::Deploy, "unknown".to_string()));
            }
        };

        let source = parsed.source.unwrap_or_else(|| "unknown".to_string());

        let action = match parsed.action.as_deref() {
            None | Some("deploy") => Self::Deploy,
            Some("check") => Self::Check,
            Some(other) => {
                return Err(Error::UnknownAction {
                    action: other.to_string(),
                });
            }
        };

        Ok((action, source))
    }

    /// Mode flag passed to the deploy script
    pub fn script_arg(&self) -> &'static str {
        match self {
            Self::Deploy => "--auto",
            Self::Check => "--check",
        }
    }

    /// Wall-clock timeout for this action, in seconds
    pub fn timeout_secs(&self, config: &DeployConfig) -> u64 {
        match self {
            Self::Deploy => config.deploy_timeout,
            Self::Check => config.check_timeout,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deploy => "deploy",
            Self::Check => "check",
        }
    }
}
