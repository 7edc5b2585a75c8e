//! Configuration for the webhook receiver
//!
//! Configuration is read once at startup from an optional TOML file, with
//! environment/CLI overrides applied on top, and passed explicitly into the
//! server. There is no hot reload.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

/// Default wall-clock timeout for a full deployment, in seconds
pub const DEFAULT_DEPLOY_TIMEOUT: u64 = 300;

/// Default wall-clock timeout for an update check, in seconds
pub const DEFAULT_CHECK_TIMEOUT: u64 = 60;

/// Immutable service configuration, fixed at process start
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub deploy: DeployConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to listen on, bound on all interfaces
    pub port: u16,
    /// Maximum accepted request body size in bytes
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 9000,
            max_request_size: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared webhook secret. Empty means open mode: every request to
    /// /deploy is authorized. That is an operational risk the operator
    /// opts into, not a misconfiguration.
    pub secret: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Deployment root; the working directory for the deploy script
    pub root: PathBuf,
    /// Deploy script location, relative to the deployment root
    pub script: PathBuf,
    /// Timeout for the `deploy` action, in seconds
    pub deploy_timeout: u64,
    /// Timeout for the `check` action, in seconds
    pub check_timeout: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            script: PathBuf::from("scripts/sync-and-deploy.sh"),
            deploy_timeout: DEFAULT_DEPLOY_TIMEOUT,
            check_timeout: DEFAULT_CHECK_TIMEOUT,
        }
    }
}

impl DeployConfig {
    /// Absolute location of the deploy script
    pub fn script_path(&self) -> PathBuf {
        self.root.join(&self.script)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Append-only request log file; unset disables file logging
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: Some(PathBuf::from("/var/log/deployhook.log")),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config: Config = toml::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid {
                message: "server.port must be non-zero".to_string(),
            }
            .into());
        }
        if self.deploy.deploy_timeout == 0 || self.deploy.check_timeout == 0 {
            return Err(ConfigError::Invalid {
                message: "deploy timeouts must be non-zero".to_string(),
            }
            .into());
        }
        if self.deploy.script.is_absolute() {
            return Err(ConfigError::Invalid {
                message: format!(
                    "deploy.script must be relative to deploy.root, got '{}'",
                    self.deploy.script.display()
                ),
            }
            .into());
        }
        Ok(())
    }
}
