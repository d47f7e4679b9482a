//! Serve command handler: run the HTTP API.

use anyhow::{Context, Result};
use resolveurl_core::FileConfig;
use resolveurl_core::api::{self, AppState};
use tracing::info;

use super::registry_from_config;
use crate::cli::ServeArgs;

pub async fn run_serve_command(args: &ServeArgs, config: &FileConfig) -> Result<()> {
    let host = args.host.clone().unwrap_or_else(|| config.host_or_default());
    let port = args.port.unwrap_or_else(|| config.port_or_default());

    let address = tokio::net::lookup_host((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to resolve bind address '{host}:{port}'"))?
        .next()
        .with_context(|| format!("No usable address for '{host}:{port}'"))?;

    let registry = registry_from_config(config);
    let state = AppState::new(
        registry,
        config.dispatch_options(),
        config.concurrency_or_default(),
    )?;

    info!(%address, "Starting resolveurl API");
    api::run(address, state)
        .await
        .with_context(|| format!("API server on {address} failed"))
}
