// src/main.rs

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use hostwarden::config::{AgentArgs, AgentConfig};
use hostwarden::server::{router, AppState};
use hostwarden::service::MemoryRegistry;
use hostwarden::utils::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = AgentArgs::parse();
    let config = AgentConfig::from_args(args)?;

    // Initialize logging; the guard must outlive the server so buffered
    // file output is flushed on shutdown.
    let _log_guard = init_logging(&config.log_level, config.log_file.as_deref())?;

    tracing::info!("Starting hostwarden agent");
    tracing::info!("Agent version: {}", env!("CARGO_PKG_VERSION"));

    let registry = Arc::new(MemoryRegistry::new());
    let state = AppState::new(registry);
    let app = router(state);

    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!("Listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
