// src/service/directory.rs
//! Read side of the service catalog.
//!
//! Enumeration, substring search, and single-service lookup. Every call
//! queries the registry fresh; nothing is cached.

use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::service::query::ServiceQuery;
use crate::service::registry::{ServiceRecord, ServiceRegistry};
use crate::service::types::{ServiceDescriptor, ServiceState, StartMode};

pub struct ServiceDirectory {
    registry: Arc<dyn ServiceRegistry>,
}

impl ServiceDirectory {
    pub fn new(registry: Arc<dyn ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// Every registered service.
    pub async fn list_all(&self) -> Result<Vec<ServiceDescriptor>> {
        self.run(ServiceQuery::All).await
    }

    /// Services whose name contains `fragment`, case-insensitively. An
    /// empty fragment lists everything.
    pub async fn search(&self, fragment: &str) -> Result<Vec<ServiceDescriptor>> {
        if fragment.is_empty() {
            return self.list_all().await;
        }
        self.run(ServiceQuery::NameContains(fragment.to_string()))
            .await
    }

    /// The service with exactly this name, matched case-insensitively.
    /// `Ok(None)` when no such service is registered.
    pub async fn get_one(&self, name: &str) -> Result<Option<ServiceDescriptor>> {
        let mut matches = self.run(ServiceQuery::NameEquals(name.to_string())).await?;
        if matches.is_empty() {
            return Ok(None);
        }
        Ok(Some(matches.remove(0)))
    }

    async fn run(&self, query: ServiceQuery) -> Result<Vec<ServiceDescriptor>> {
        let rendered = query.render();
        debug!(query = %rendered, "running service query");
        let rows = self.registry.query(&rendered).await?;
        Ok(rows.iter().map(decode_row).collect())
    }
}

/// Decode one registry row into a descriptor. Absent attributes default to
/// empty strings.
fn decode_row(row: &ServiceRecord) -> ServiceDescriptor {
    let field = |key: &str| row.get(key).cloned().unwrap_or_default();

    ServiceDescriptor {
        name: field("Name"),
        display_name: field("DisplayName"),
        description: field("Description"),
        state: ServiceState::from_registry(&field("State")),
        start_mode: StartMode::from_registry(&field("StartMode")),
        account: field("StartName"),
        executable_path: field("PathName"),
    }
}
