// src/config/settings.rs
//! Agent configuration settings.
//!
//! This module contains the agent configuration structures and
//! implementation for loading, parsing, and validating user-provided
//! settings.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::config::defaults;

/// Error type for configuration-related operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(#[from] std::net::AddrParseError),
}

/// Command line arguments for the agent
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "hostwarden",
    about = "Remote host administration agent exposing filesystem and service management over HTTP",
    version,
    author
)]
pub struct AgentArgs {
    /// Address to listen on
    #[clap(long, default_value = defaults::DEFAULT_LISTEN_ADDRESS)]
    pub listen: String,

    /// Port for the HTTP API
    #[clap(long, default_value_t = defaults::DEFAULT_PORT)]
    pub port: u16,

    /// Log level
    #[clap(long, default_value = defaults::DEFAULT_LOG_LEVEL)]
    pub log_level: String,

    /// Optional file to mirror log output into
    #[clap(long)]
    pub log_file: Option<PathBuf>,
}

/// Agent configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// HTTP listen address
    pub listen_addr: SocketAddr,

    /// Log level filter
    pub log_level: String,

    /// Optional log file
    pub log_file: Option<PathBuf>,
}

impl AgentConfig {
    /// Create a new agent configuration from command line arguments
    pub fn from_args(args: AgentArgs) -> Result<Self, ConfigError> {
        let listen_addr: SocketAddr = format!("{}:{}", args.listen, args.port).parse()?;

        let config = Self {
            listen_addr,
            log_level: args.log_level,
            log_file: args.log_file,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration settings
    fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Log level must not be empty".to_string(),
            ));
        }

        if let Some(path) = &self.log_file {
            if path.file_name().is_none() {
                return Err(ConfigError::Invalid(format!(
                    "Log file path has no file name: {}",
                    path.display()
                )));
            }
        }

        Ok(())
    }
}
