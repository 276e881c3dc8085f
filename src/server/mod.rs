// src/server/mod.rs
//! HTTP boundary.
//!
//! A thin axum router over the dispatcher. Handlers translate transport
//! details (query strings, path segments, JSON bodies) into dispatch calls
//! and map error classes to status codes; no command logic lives here.

mod routes;

pub use routes::{router, AppState};
