// src/service/types.rs
//! Service catalog data model.
//!
//! Descriptors are decoded from registry rows and serialized to the wire;
//! states and start modes round-trip through the registry's string forms.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

/// Lifecycle state reported by the service registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Running,
    Stopped,
    StartPending,
    StopPending,
    ContinuePending,
    PausePending,
    Paused,
    /// Any state string without a dedicated variant passes through as-is.
    Unknown(String),
}

impl ServiceState {
    /// Decode the registry's state string.
    pub fn from_registry(s: &str) -> Self {
        match s {
            "Running" => Self::Running,
            "Stopped" => Self::Stopped,
            "Start Pending" => Self::StartPending,
            "Stop Pending" => Self::StopPending,
            "Continue Pending" => Self::ContinuePending,
            "Pause Pending" => Self::PausePending,
            "Paused" => Self::Paused,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "Running",
            Self::Stopped => "Stopped",
            Self::StartPending => "Start Pending",
            Self::StopPending => "Stop Pending",
            Self::ContinuePending => "Continue Pending",
            Self::PausePending => "Pause Pending",
            Self::Paused => "Paused",
            Self::Unknown(other) => other,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ServiceState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ServiceState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_registry(&s))
    }
}

/// Configured start mode of a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartMode {
    Boot,
    System,
    Automatic,
    Manual,
    Disabled,
    /// Any mode string without a dedicated variant passes through as-is.
    Unknown(String),
}

impl StartMode {
    /// Decode the registry's mode string. Registry rows report automatic
    /// services as `Auto`; the mode-change call spells it `Automatic`.
    pub fn from_registry(s: &str) -> Self {
        match s {
            "Boot" => Self::Boot,
            "System" => Self::System,
            "Auto" | "Automatic" => Self::Automatic,
            "Manual" => Self::Manual,
            "Disabled" => Self::Disabled,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Parse a caller-supplied mode. Only `Automatic`, `Manual` and
    /// `Disabled` may be requested; matching is case-insensitive.
    pub fn parse_request(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "automatic" => Some(Self::Automatic),
            "manual" => Some(Self::Manual),
            "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Boot => "Boot",
            Self::System => "System",
            Self::Automatic => "Automatic",
            Self::Manual => "Manual",
            Self::Disabled => "Disabled",
            Self::Unknown(other) => other,
        }
    }
}

impl fmt::Display for StartMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StartMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StartMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_registry(&s))
    }
}

/// One registered service, fetched fresh from the registry per query.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDescriptor {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub state: ServiceState,
    pub start_mode: StartMode,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub executable_path: String,
}

/// Result codes of the registry's start-mode change call. The table is the
/// only process-wide shared state in the agent and is never mutated.
static START_MODE_CHANGE_ERRORS: Lazy<HashMap<u32, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (1, "The request is not supported."),
        (2, "The user did not have the necessary access."),
        (3, "The service cannot be stopped because other services that are running are dependent on it."),
        (4, "The requested control code is not valid, or it is unacceptable to the service."),
        (5, "The requested control code cannot be sent to the service because of the state of the service."),
        (6, "The service has not been started."),
        (7, "The service did not respond to the start request in a timely fashion."),
        (8, "Unknown failure when starting the service."),
        (9, "The directory path to the service executable file was not found."),
        (10, "The service is already running."),
        (11, "The database to add a new service is locked."),
        (12, "A dependency this service relies on has been removed from the system."),
        (13, "The service failed to find the service needed from a dependent service."),
        (14, "The service has been disabled from the system."),
        (15, "The service does not have the correct authentication to run on the system."),
        (16, "This service is being removed from the system."),
        (17, "The service has no execution thread."),
        (18, "The service has circular dependencies when it starts."),
        (19, "A service is running under the same name."),
        (20, "The service name has invalid characters."),
        (21, "Invalid parameters have been passed to the service."),
        (22, "The account under which this service runs is either invalid or lacks the permissions to run the service."),
        (23, "The service exists in the database of services available from the system."),
        (24, "The service is currently paused in the system."),
    ])
});

/// Human-readable description of a non-zero mode-change result code.
pub fn start_mode_change_error(code: u32) -> String {
    START_MODE_CHANGE_ERRORS
        .get(&code)
        .map(|message| (*message).to_string())
        .unwrap_or_else(|| format!("Unspecified error with code {code}."))
}
