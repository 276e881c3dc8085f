// src/config/constants.rs
//! Application constants and fixed settings.
//!
//! These values are part of the agent's behavior contract and are not
//! configurable at runtime.

use std::time::Duration;

/// Service transition waits
pub const SERVICE_START_TIMEOUT: Duration = Duration::from_secs(20);
pub const SERVICE_STOP_TIMEOUT: Duration = Duration::from_secs(20);
pub const SERVICE_POLL_INTERVAL: Duration = Duration::from_millis(500); // fixed interval, no backoff
