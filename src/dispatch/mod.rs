// src/dispatch/mod.rs
//! Action dispatch.
//!
//! One request becomes at most one executor operation: the action string
//! resolves against a closed set, parameters bind leniently, validation
//! collects every broken rule, and only a clean command reaches an
//! executor. Failures come back as classified [`AgentError`] values and
//! the envelope carries them unmodified.

mod action;
mod command;
mod params;
mod validation;

pub use action::Action;
pub use command::Command;
pub use params::ParamBag;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AgentError, ErrorBody, Result};
use crate::fs::{FileContent, FileSystemExecutor};
use crate::service::{ServiceDirectory, ServiceRegistry, ServiceSupervisor};

/// What a successful command produced.
#[derive(Debug)]
pub enum CommandOutput {
    /// A JSON document for the response body.
    Json(Value),
    /// An open file to stream back.
    File(FileContent),
}

/// Uniform envelope for JSON-producing commands.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl CommandResponse {
    pub fn success(result: Value) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: &AgentError) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.to_body()),
        }
    }
}

pub struct Dispatcher {
    files: FileSystemExecutor,
    directory: ServiceDirectory,
    supervisor: ServiceSupervisor,
}

impl Dispatcher {
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self {
            files: FileSystemExecutor::new(),
            directory: ServiceDirectory::new(registry.clone()),
            supervisor: ServiceSupervisor::new(registry),
        }
    }

    /// Resolve, bind, validate, then run exactly one executor operation.
    pub async fn dispatch(&self, action: Option<&str>, params: &ParamBag) -> Result<CommandOutput> {
        let raw = action.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(AgentError::MissingAction);
        }
        let action =
            Action::resolve(raw).ok_or_else(|| AgentError::UnknownAction(raw.to_string()))?;
        let command = Command::bind(action, params);

        let errors = validation::validate(&command);
        if !errors.is_empty() {
            debug!(%action, fields = errors.len(), "request failed validation");
            return Err(AgentError::Validation(errors));
        }

        info!(%action, "dispatching");
        self.execute(command).await
    }

    async fn execute(&self, command: Command) -> Result<CommandOutput> {
        match command {
            Command::Copy {
                source,
                dest,
                overwrite,
            } => {
                self.files.copy(&source, &dest, overwrite).await?;
                Ok(CommandOutput::Json(Value::Null))
            }
            Command::Move {
                source,
                dest,
                overwrite,
            } => {
                self.files.move_path(&source, &dest, overwrite).await?;
                Ok(CommandOutput::Json(Value::Null))
            }
            Command::Delete { path } => {
                self.files.delete(&path).await?;
                Ok(CommandOutput::Json(Value::Null))
            }
            Command::Get { path } => {
                let content = self.files.get(&path).await?;
                Ok(CommandOutput::File(content))
            }
            Command::List { path } => {
                let entries = self.files.list(&path).await?;
                to_json(entries)
            }
            Command::Start { service_name } => {
                let descriptor = self.supervisor.start(&service_name).await?;
                to_json(descriptor)
            }
            Command::Stop { service_name } => {
                let descriptor = self.supervisor.stop(&service_name).await?;
                to_json(descriptor)
            }
            Command::Restart { service_name } => {
                let descriptor = self.supervisor.restart(&service_name).await?;
                to_json(descriptor)
            }
            Command::SetStartMode {
                service_name,
                start_mode,
            } => {
                let mode = validation::require_start_mode(start_mode)?;
                let descriptor = self.supervisor.set_start_mode(&service_name, mode).await?;
                to_json(descriptor)
            }
        }
    }

    /// Read access for boundaries that query services without an action.
    pub fn directory(&self) -> &ServiceDirectory {
        &self.directory
    }

    /// Read access for boundaries that serve files without an action.
    pub fn files(&self) -> &FileSystemExecutor {
        &self.files
    }
}

fn to_json<T: Serialize>(value: T) -> Result<CommandOutput> {
    let body = serde_json::to_value(value).map_err(std::io::Error::from)?;
    Ok(CommandOutput::Json(body))
}
