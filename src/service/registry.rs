// src/service/registry.rs
//! Boundary trait for the OS service catalog.
//!
//! The directory and supervisor never touch the OS directly; they go
//! through this trait. Production hosts plug in a transport for their
//! service manager, tests plug in mocks or the in-memory registry.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::error::AgentError;

/// One row from a registry query: a loose attribute map decoded downstream.
pub type ServiceRecord = HashMap<String, String>;

/// Faults raised by a registry implementation.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A transition was rejected because of the service's current state,
    /// for example starting a service that is already running.
    #[error("{0}")]
    InvalidState(String),

    /// The named service is not registered.
    #[error("no service named '{0}' is registered")]
    UnknownService(String),

    /// The registry itself failed (connection, protocol, permissions).
    #[error("registry failure: {0}")]
    Failure(String),
}

impl From<RegistryError> for AgentError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidState(message) => AgentError::InvalidServiceState(message),
            RegistryError::UnknownService(name) => AgentError::ServiceNotFound(name),
            RegistryError::Failure(message) => AgentError::ServiceControl(message),
        }
    }
}

/// Raw primitives the directory and supervisor build on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRegistry: Send + Sync {
    /// Run a query in the registry's query language and return the
    /// matching rows.
    async fn query(&self, query: &str) -> Result<Vec<ServiceRecord>, RegistryError>;

    /// Signal the named service to start. The signal does not wait for
    /// the service to reach `Running`.
    async fn start_service(&self, name: &str) -> Result<(), RegistryError>;

    /// Signal the named service to stop. The signal does not wait for
    /// the service to reach `Stopped`.
    async fn stop_service(&self, name: &str) -> Result<(), RegistryError>;

    /// Change the configured start mode, returning the registry's raw
    /// result code. Zero means the change was accepted.
    async fn change_start_mode(&self, name: &str, mode: &str) -> Result<u32, RegistryError>;
}
