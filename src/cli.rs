use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tokio::signal;
use tracing::info;

use crate::config::Config;
use crate::error::Result;

#[derive(Parser)]
#[command(name = "deployhook")]
#[command(about = "A minimal authenticated webhook receiver that triggers deployments")]
#[command(long_about = "
A single-binary HTTP service that accepts authenticated deployment requests
(from CI, an operator, or a poller) and runs the local sync-and-deploy
script, reporting the outcome synchronously.
")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override listen port
    #[arg(long, env = "WEBHOOK_PORT")]
    pub port: Option<u16>,

    /// Override shared webhook secret (empty disables authentication)
    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Override deployment root directory
    #[arg(long, env = "DEPLOY_ROOT")]
    pub deploy_root: Option<PathBuf>,

    /// Override log level
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Run the webhook receiver server (default if no subcommand given)
    Run(RunArgs),
    /// Validate the configuration file
    Validate,
    /// Show version information
    Version,
}

#[derive(Args, Clone, Default)]
pub struct RunArgs {
    /// Set log format
    #[arg(long)]
    pub log_format: Option<LogFormat>,
}

impl Cli {
    /// Get effective log level considering verbose/quiet flags
    pub fn effective_log_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else if self.quiet {
            LogLevel::Error
        } else {
            self.log_level.clone().unwrap_or(LogLevel::Info)
        }
    }

    /// Convert LogLevel enum to string for the logging module
    pub fn log_level_to_str(&self) -> &'static str {
        match self.effective_log_level() {
            LogLevel::Trace => crate::logging::level::TRACE,
            LogLevel::Debug => crate::logging::level::DEBUG,
            LogLevel::Info => crate::logging::level::INFO,
            LogLevel::Warn => crate::logging::level::WARN,
            LogLevel::Error => crate::logging::level::ERROR,
        }
    }

    /// Get log format override from CLI arguments
    pub fn log_format_override(&self) -> Option<&'static str> {
        match &self.command {
            Some(Commands::Run(args)) => args.log_format.as_ref().map(|fmt| match fmt {
                LogFormat::Json => crate::logging::format::JSON,
                LogFormat::Pretty => crate::logging::format::PRETTY,
            }),
            _ => None,
        }
    }

    /// Build the effective configuration: optional TOML file, then CLI and
    /// environment overrides on top. Constructed once and passed explicitly;
    /// nothing reads configuration after startup.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::default(),
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(secret) = &self.secret {
            config.auth.secret = secret.clone();
        }
        if let Some(root) = &self.deploy_root {
            config.deploy.root = root.clone();
        }

        config.validate()?;
        Ok(config)
    }
}

/// Run the webhook receiver server
pub async fn run_server(config: Config) -> Result<()> {
    info!(
        port = config.server.port,
        deploy_root = %config.deploy.root.display(),
        script = %config.deploy.script_path().display(),
        open_mode = config.auth.secret.is_empty(),
        "Starting server"
    );

    if config.auth.secret.is_empty() {
        tracing::warn!(
            "No webhook secret configured - running in open mode, every deploy request is accepted"
        );
    }

    let shutdown_signal = setup_shutdown_signal();
    crate::http::start_server(config, shutdown_signal).await
}

/// Validate the configuration file and report the outcome
pub async fn validate_config(config: Config) -> Result<()> {
    config.validate()?;

    let script_path = config.deploy.script_path();
    if !script_path.exists() {
        tracing::warn!(
            script = %script_path.display(),
            "Deploy script does not exist yet; /deploy will return 500 until it does"
        );
    }

    println!("Configuration is valid");
    Ok(())
}

/// Show version information
pub async fn show_version() -> Result<()> {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// Resolve on SIGINT or SIGTERM
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
