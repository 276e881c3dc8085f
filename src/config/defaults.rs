// src/config/defaults.rs
//! Default configurations for the hostwarden agent.
//!
//! This module provides sensible default values for configuration settings
//! when not explicitly specified by the user.

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDRESS: &str = "0.0.0.0";

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 8700;

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";
