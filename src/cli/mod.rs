//! CLI module
//!
//! Provides:
//! - Argument parsing (`ask`, `exec`, `schema`, `log`)
//! - Home directory resolution (flag → env → cwd)
//! - Diagnostics setup (stderr + daily rolling file)
//! - Command dispatch

pub mod args;
pub mod dispatch;
pub mod home;
pub mod logging;

// Re-exports
pub use args::{parse_args, Args, Command, SchemaTarget};
pub use dispatch::{run_cli_mode, ExitCode};
pub use home::resolve_home;

/// CLI errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] crate::llm::GatewayError),

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Store(format!("{:#}", e))
    }
}

/// Exit codes (deterministic)
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_SETUP_ERROR: i32 = 2;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, Error>;
