// src/main.rs
// =============================================================================
// This is the entry point of the page-inspector service.
//
// What happens here:
// 1. Set up logging (RUST_LOG controls the level, default "info")
// 2. Parse configuration from flags / environment variables using clap
// 3. Build the shared HTTP client and the in-memory stores
// 4. Serve the HTTP API until the process is stopped
// 5. Exit with code 2 if startup fails
// =============================================================================

// Module declarations - tells Rust about our other source files
mod api;     // src/api/ - HTTP routes, operations and pagination
mod checker; // src/checker/ - page analysis and link probing
mod cli;     // src/cli.rs - configuration
mod models;  // src/models.rs - shared data types
mod storage; // src/storage/ - in-memory result store

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use api::AppState;
use cli::Cli;

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    let settings = Cli::parse().settings();

    tracing::info!(
        port = settings.port,
        page_size = settings.page_size,
        scrape_timeout = ?settings.scrape_timeout,
        probe_timeout = ?settings.probe_timeout,
        max_concurrent_probes = ?settings.max_concurrent_probes,
        strict_tls = settings.strict_tls,
        "starting page-inspector"
    );

    let client =
        checker::build_client(settings.strict_tls).context("failed to create HTTP client")?;
    let port = settings.port;
    let state = Arc::new(AppState::new(settings, client));

    api::serve(port, state).await
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
