// src/error.rs
//! Fault classification shared by every executor.
//!
//! Executors return `AgentError` values instead of raising. The dispatcher
//! forwards them unmodified and the HTTP boundary maps each class to a
//! status code, so a fault keeps its classification all the way to the wire.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Field name to rule message, collected before any side effect runs.
pub type ValidationErrors = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum AgentError {
    /// One or more command fields failed validation. No executor ran.
    #[error("One or more fields failed validation.")]
    Validation(ValidationErrors),

    /// The action string resolved to no known command. Carries the
    /// original, un-normalized action string.
    #[error("Unknown action command - '{0}'.")]
    UnknownAction(String),

    /// The request carried no action value at all.
    #[error("A value for action is not provided.")]
    MissingAction,

    /// A path did not resolve to an existing file or directory.
    #[error("{0}")]
    NotFound(String),

    /// A destination already exists and overwrite was not requested.
    #[error("{0}")]
    AlreadyExists(String),

    /// No service with the requested name is registered.
    #[error("The service '{0}' is not found.")]
    ServiceNotFound(String),

    /// The registry rejected a transition because of the service's current
    /// state, for example starting a service that is already running.
    #[error("{0}")]
    InvalidServiceState(String),

    /// A transition signal was accepted but the service never reached the
    /// target state, or the registry reported a control fault.
    #[error("{0}")]
    ServiceControl(String),

    /// Underlying OS fault that is none of the classes above.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wire form of a classified failure.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl AgentError {
    /// Stable classification tag for logs and response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::UnknownAction(_) => "UNKNOWN_ACTION",
            Self::MissingAction => "MISSING_ACTION",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::ServiceNotFound(_) => "SERVICE_NOT_FOUND",
            Self::InvalidServiceState(_) => "INVALID_SERVICE_STATE",
            Self::ServiceControl(_) => "SERVICE_CONTROL",
            Self::Io(_) => "IO",
        }
    }

    /// Wire form: code, human-readable message, and the field map for
    /// validation failures.
    pub fn to_body(&self) -> ErrorBody {
        let details = match self {
            Self::Validation(fields) => {
                Some(serde_json::to_value(fields).unwrap_or(Value::Null))
            }
            _ => None,
        };
        ErrorBody {
            code: self.code().to_string(),
            message: self.to_string(),
            details,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
