// src/service/memory.rs
//! In-process service registry.
//!
//! Keeps a seedable service table and interprets the same query shapes the
//! directory renders, so the whole pipeline can run without a real service
//! manager. Transitions settle immediately by default; a registry built
//! with transition probes lingers in the pending state for that many
//! queries first, which exercises the poll wait.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::service::query::unescape_value;
use crate::service::registry::{RegistryError, ServiceRecord, ServiceRegistry};
use crate::service::types::{ServiceDescriptor, ServiceState, StartMode};

#[derive(Debug, Clone)]
struct Entry {
    descriptor: ServiceDescriptor,
    settle_to: Option<ServiceState>,
    probes_left: u32,
    mode_change_code: u32,
}

pub struct MemoryRegistry {
    services: Mutex<Vec<Entry>>,
    transition_probes: u32,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::with_transition_probes(0)
    }

    /// A registry whose transitions stay in their pending state for
    /// `probes` queries before settling.
    pub fn with_transition_probes(probes: u32) -> Self {
        Self {
            services: Mutex::new(Vec::new()),
            transition_probes: probes,
        }
    }

    /// Register a service.
    pub async fn insert(&self, descriptor: ServiceDescriptor) {
        self.services.lock().await.push(Entry {
            descriptor,
            settle_to: None,
            probes_left: 0,
            mode_change_code: 0,
        });
    }

    /// Make the next mode change for this service answer with `code`.
    pub async fn set_mode_change_code(&self, name: &str, code: u32) {
        let mut services = self.services.lock().await;
        if let Some(entry) = find_mut(&mut services, name) {
            entry.mode_change_code = code;
        }
    }

    /// Current state, for assertions.
    pub async fn state_of(&self, name: &str) -> Option<ServiceState> {
        let mut services = self.services.lock().await;
        find_mut(&mut services, name).map(|entry| entry.descriptor.state.clone())
    }

    /// Current start mode, for assertions.
    pub async fn start_mode_of(&self, name: &str) -> Option<StartMode> {
        let mut services = self.services.lock().await;
        find_mut(&mut services, name).map(|entry| entry.descriptor.start_mode.clone())
    }

    fn begin_transition(&self, entry: &mut Entry, pending: ServiceState, target: ServiceState) {
        if self.transition_probes == 0 {
            entry.descriptor.state = target;
            entry.settle_to = None;
            entry.probes_left = 0;
        } else {
            entry.descriptor.state = pending;
            entry.settle_to = Some(target);
            entry.probes_left = self.transition_probes;
        }
    }

    /// One query observes the table once; pending transitions settle after
    /// they have been observed `transition_probes` times.
    fn tick(entries: &mut [Entry]) {
        for entry in entries.iter_mut() {
            if let Some(target) = entry.settle_to.clone() {
                if entry.probes_left == 0 {
                    entry.descriptor.state = target;
                    entry.settle_to = None;
                } else {
                    entry.probes_left -= 1;
                }
            }
        }
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceRegistry for MemoryRegistry {
    async fn query(&self, query: &str) -> Result<Vec<ServiceRecord>, RegistryError> {
        let shape = parse_query(query)
            .ok_or_else(|| RegistryError::Failure(format!("unsupported query: {query}")))?;
        let mut services = self.services.lock().await;
        Self::tick(&mut services);
        Ok(services
            .iter()
            .filter(|entry| shape.matches(&entry.descriptor.name))
            .map(|entry| encode_row(&entry.descriptor))
            .collect())
    }

    async fn start_service(&self, name: &str) -> Result<(), RegistryError> {
        let mut services = self.services.lock().await;
        let entry = find_mut(&mut services, name)
            .ok_or_else(|| RegistryError::UnknownService(name.to_string()))?;

        match entry.descriptor.state {
            ServiceState::Running | ServiceState::StartPending => {
                return Err(RegistryError::InvalidState(format!(
                    "The service '{}' is already running.",
                    entry.descriptor.name
                )));
            }
            _ => {}
        }
        if entry.descriptor.start_mode == StartMode::Disabled {
            return Err(RegistryError::InvalidState(format!(
                "The service '{}' has been disabled from the system.",
                entry.descriptor.name
            )));
        }

        self.begin_transition(entry, ServiceState::StartPending, ServiceState::Running);
        Ok(())
    }

    async fn stop_service(&self, name: &str) -> Result<(), RegistryError> {
        let mut services = self.services.lock().await;
        let entry = find_mut(&mut services, name)
            .ok_or_else(|| RegistryError::UnknownService(name.to_string()))?;

        match entry.descriptor.state {
            ServiceState::Stopped | ServiceState::StopPending => {
                return Err(RegistryError::InvalidState(format!(
                    "The service '{}' has not been started.",
                    entry.descriptor.name
                )));
            }
            _ => {}
        }

        self.begin_transition(entry, ServiceState::StopPending, ServiceState::Stopped);
        Ok(())
    }

    async fn change_start_mode(&self, name: &str, mode: &str) -> Result<u32, RegistryError> {
        let mut services = self.services.lock().await;
        let entry = find_mut(&mut services, name)
            .ok_or_else(|| RegistryError::UnknownService(name.to_string()))?;

        if entry.mode_change_code != 0 {
            return Ok(entry.mode_change_code);
        }
        entry.descriptor.start_mode = StartMode::from_registry(mode);
        Ok(0)
    }
}

fn find_mut<'a>(entries: &'a mut [Entry], name: &str) -> Option<&'a mut Entry> {
    entries
        .iter_mut()
        .find(|entry| entry.descriptor.name.eq_ignore_ascii_case(name))
}

fn encode_row(descriptor: &ServiceDescriptor) -> ServiceRecord {
    // Rows report automatic services as "Auto", matching the registry's
    // row form rather than the request form.
    let start_mode = match descriptor.start_mode {
        StartMode::Automatic => "Auto",
        ref other => other.as_str(),
    };
    ServiceRecord::from([
        ("Name".to_string(), descriptor.name.clone()),
        ("DisplayName".to_string(), descriptor.display_name.clone()),
        ("Description".to_string(), descriptor.description.clone()),
        ("State".to_string(), descriptor.state.as_str().to_string()),
        ("StartMode".to_string(), start_mode.to_string()),
        ("StartName".to_string(), descriptor.account.clone()),
        ("PathName".to_string(), descriptor.executable_path.clone()),
    ])
}

#[derive(Debug, PartialEq, Eq)]
enum QueryShape {
    All,
    Contains(String),
    Equals(String),
}

impl QueryShape {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Contains(fragment) => name
                .to_ascii_lowercase()
                .contains(&fragment.to_ascii_lowercase()),
            Self::Equals(target) => name.eq_ignore_ascii_case(target),
        }
    }
}

fn parse_query(query: &str) -> Option<QueryShape> {
    let rest = query.strip_prefix("SELECT * FROM Win32_Service")?.trim_start();
    if rest.is_empty() {
        return Some(QueryShape::All);
    }
    if let Some(value) = rest
        .strip_prefix("WHERE Name LIKE '%")
        .and_then(|r| r.strip_suffix("%'"))
    {
        return Some(QueryShape::Contains(unescape_value(value)));
    }
    if let Some(value) = rest
        .strip_prefix("WHERE Name='")
        .and_then(|r| r.strip_suffix('\''))
    {
        return Some(QueryShape::Equals(unescape_value(value)));
    }
    None
}
