// src/service/supervisor.rs
//! Write side of the service catalog: start, stop, restart, start mode.
//!
//! Transitions are a signal followed by one bounded poll-until-state wait.
//! The wait never retries the signal and never backs off; when the ceiling
//! passes the whole operation fails.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::constants::{
    SERVICE_POLL_INTERVAL, SERVICE_START_TIMEOUT, SERVICE_STOP_TIMEOUT,
};
use crate::error::{AgentError, Result};
use crate::service::directory::ServiceDirectory;
use crate::service::registry::ServiceRegistry;
use crate::service::types::{start_mode_change_error, ServiceDescriptor, ServiceState, StartMode};

pub struct ServiceSupervisor {
    registry: Arc<dyn ServiceRegistry>,
    directory: ServiceDirectory,
}

impl ServiceSupervisor {
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self {
            directory: ServiceDirectory::new(registry.clone()),
            registry,
        }
    }

    /// Start the service and wait until the registry reports `Running`.
    /// A registry rejection, such as starting a service that is already
    /// running, surfaces unmodified as `InvalidServiceState`.
    pub async fn start(&self, name: &str) -> Result<ServiceDescriptor> {
        let descriptor = self.resolve(name).await?;
        info!(service = %descriptor.name, "starting service");
        self.registry.start_service(&descriptor.name).await?;
        self.wait_for_state(&descriptor.name, ServiceState::Running, SERVICE_START_TIMEOUT)
            .await?;
        self.resolve(&descriptor.name).await
    }

    /// Stop the service and wait until the registry reports `Stopped`.
    pub async fn stop(&self, name: &str) -> Result<ServiceDescriptor> {
        let descriptor = self.resolve(name).await?;
        info!(service = %descriptor.name, "stopping service");
        self.registry.stop_service(&descriptor.name).await?;
        self.wait_for_state(&descriptor.name, ServiceState::Stopped, SERVICE_STOP_TIMEOUT)
            .await?;
        self.resolve(&descriptor.name).await
    }

    /// Stop then start, each with its own bounded wait. A failed stop
    /// aborts the restart; there is no partial-restart recovery.
    pub async fn restart(&self, name: &str) -> Result<ServiceDescriptor> {
        let descriptor = self.resolve(name).await?;
        info!(service = %descriptor.name, "restarting service");
        self.registry.stop_service(&descriptor.name).await?;
        self.wait_for_state(&descriptor.name, ServiceState::Stopped, SERVICE_STOP_TIMEOUT)
            .await?;
        self.registry.start_service(&descriptor.name).await?;
        self.wait_for_state(&descriptor.name, ServiceState::Running, SERVICE_START_TIMEOUT)
            .await?;
        self.resolve(&descriptor.name).await
    }

    /// Change the configured start mode. The call is synchronous: the
    /// registry answers with a result code and there is no state to wait
    /// for. Non-zero codes map through the fixed code table.
    pub async fn set_start_mode(&self, name: &str, mode: StartMode) -> Result<ServiceDescriptor> {
        let descriptor = self.resolve(name).await?;
        let code = self
            .registry
            .change_start_mode(&descriptor.name, mode.as_str())
            .await?;
        if code != 0 {
            warn!(service = %descriptor.name, code, "start mode change rejected");
            return Err(AgentError::ServiceControl(start_mode_change_error(code)));
        }
        info!(service = %descriptor.name, mode = %mode, "start mode changed");
        self.resolve(&descriptor.name).await
    }

    async fn resolve(&self, name: &str) -> Result<ServiceDescriptor> {
        self.directory
            .get_one(name)
            .await?
            .ok_or_else(|| AgentError::ServiceNotFound(name.to_string()))
    }

    /// Poll the reported state at a fixed interval until it matches
    /// `target` or the ceiling passes.
    async fn wait_for_state(
        &self,
        name: &str,
        target: ServiceState,
        timeout: Duration,
    ) -> Result<()> {
        debug!(service = name, target = %target, "waiting for service state");
        let deadline = Instant::now() + timeout;
        loop {
            let current = self.resolve(name).await?.state;
            if current == target {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AgentError::ServiceControl(format!(
                    "The service '{name}' did not reach the {target} state within {} seconds (last reported state: {current}).",
                    timeout.as_secs()
                )));
            }
            sleep(SERVICE_POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::registry::{MockServiceRegistry, RegistryError, ServiceRecord};

    fn row(name: &str, state: &str) -> ServiceRecord {
        ServiceRecord::from([
            ("Name".to_string(), name.to_string()),
            ("DisplayName".to_string(), name.to_string()),
            ("State".to_string(), state.to_string()),
            ("StartMode".to_string(), "Manual".to_string()),
        ])
    }

    #[tokio::test]
    async fn start_rejection_surfaces_as_invalid_state() {
        let mut registry = MockServiceRegistry::new();
        registry
            .expect_query()
            .returning(|_| Ok(vec![row("spooler", "Running")]));
        registry.expect_start_service().returning(|_| {
            Err(RegistryError::InvalidState(
                "The service is already running.".to_string(),
            ))
        });

        let supervisor = ServiceSupervisor::new(Arc::new(registry));
        let err = supervisor.start("spooler").await.unwrap_err();
        assert_eq!(err.code(), "INVALID_SERVICE_STATE");
        assert_eq!(err.to_string(), "The service is already running.");
    }

    #[tokio::test]
    async fn start_of_unknown_service_is_service_not_found() {
        let mut registry = MockServiceRegistry::new();
        registry.expect_query().returning(|_| Ok(vec![]));

        let supervisor = ServiceSupervisor::new(Arc::new(registry));
        let err = supervisor.start("ghostd").await.unwrap_err();
        assert_eq!(err.code(), "SERVICE_NOT_FOUND");
    }

    #[tokio::test(start_paused = true)]
    async fn wait_times_out_when_the_state_never_settles() {
        let mut registry = MockServiceRegistry::new();
        registry
            .expect_query()
            .returning(|_| Ok(vec![row("slowpoke", "Start Pending")]));
        registry.expect_start_service().returning(|_| Ok(()));

        let supervisor = ServiceSupervisor::new(Arc::new(registry));
        let err = supervisor.start("slowpoke").await.unwrap_err();
        assert_eq!(err.code(), "SERVICE_CONTROL");
        assert!(err.to_string().contains("did not reach"));
        assert!(err.to_string().contains("20 seconds"));
    }

    #[tokio::test]
    async fn nonzero_mode_change_code_maps_through_the_table() {
        let mut registry = MockServiceRegistry::new();
        registry
            .expect_query()
            .returning(|_| Ok(vec![row("spooler", "Running")]));
        registry.expect_change_start_mode().returning(|_, _| Ok(2));

        let supervisor = ServiceSupervisor::new(Arc::new(registry));
        let err = supervisor
            .set_start_mode("spooler", StartMode::Disabled)
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The user did not have the necessary access."
        );
    }

    #[tokio::test]
    async fn mode_change_sends_the_request_spelling() {
        let mut registry = MockServiceRegistry::new();
        registry
            .expect_query()
            .returning(|_| Ok(vec![row("spooler", "Running")]));
        registry
            .expect_change_start_mode()
            .withf(|_, mode| mode == "Automatic")
            .returning(|_, _| Ok(0));

        let supervisor = ServiceSupervisor::new(Arc::new(registry));
        let service = supervisor
            .set_start_mode("spooler", StartMode::Automatic)
            .await
            .unwrap();
        assert_eq!(service.name, "spooler");
    }
}
