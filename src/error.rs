use thiserror::Error;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Unknown action: {action}")]
    UnknownAction { action: String },

    #[error("Deploy script not found: {path}")]
    ScriptMissing { path: String },

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config file parse error: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Script execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Script '{script}' could not be started: {source}")]
    StartFailed {
        script: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Script '{script}' timed out after {timeout}s")]
    Timeout { script: String, timeout: u64 },
}

/// Type alias for Results
pub type Result<T> = std::result::Result<T, Error>;
