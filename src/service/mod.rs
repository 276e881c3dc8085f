// src/service/mod.rs
//! Service inspection and lifecycle control.
//!
//! The directory answers read queries, the supervisor drives state
//! transitions, and both speak to the platform through the
//! [`ServiceRegistry`] trait. [`MemoryRegistry`] is the in-process
//! implementation used by tests and local runs.

pub mod directory;
pub mod memory;
pub mod query;
pub mod registry;
pub mod supervisor;
pub mod types;

pub use directory::ServiceDirectory;
pub use memory::MemoryRegistry;
pub use registry::{RegistryError, ServiceRecord, ServiceRegistry};
pub use supervisor::ServiceSupervisor;
pub use types::{start_mode_change_error, ServiceDescriptor, ServiceState, StartMode};
