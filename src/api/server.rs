use std::net::SocketAddr;

use axum::{Router, routing::get, routing::post};
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::handlers::{
    disable_resolver, enable_resolver, health, list_resolvers, resolve, resolve_multiple,
    search_resolvers,
};
use super::state::AppState;

/// Builds the application router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/resolve", post(resolve))
        .route("/api/resolve/multiple", post(resolve_multiple))
        .route("/api/resolvers", get(list_resolvers))
        .route("/api/resolvers/search", get(search_resolvers))
        .route("/api/resolvers/{name}/enable", post(enable_resolver))
        .route("/api/resolvers/{name}/disable", post(disable_resolver))
        .with_state(state)
}

/// Serves the API on `address` until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an I/O error if the address cannot be bound or serving fails.
pub async fn run(address: SocketAddr, state: AppState) -> std::io::Result<()> {
    let resolvers = state.registry.len();
    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, resolvers, "resolveurl API listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("resolveurl API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(error = %error, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                warn!(error = %error, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
