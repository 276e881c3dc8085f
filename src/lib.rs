// src/lib.rs
//! Remote host administration agent.
//!
//! The crate exposes filesystem manipulation and OS service lifecycle
//! control behind a single dispatcher: an action string plus an untyped
//! parameter bag becomes exactly one validated, typed command. The HTTP
//! boundary in [`server`] is a thin translation layer over that pipeline.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod fs;
pub mod server;
pub mod service;
pub mod utils;

pub use crate::dispatch::{CommandOutput, CommandResponse, Dispatcher, ParamBag};
pub use crate::error::{AgentError, Result};
pub use crate::fs::FileSystemExecutor;
pub use crate::service::{MemoryRegistry, ServiceDirectory, ServiceSupervisor};
