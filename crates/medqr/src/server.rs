//! Composition root for the web server.

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::http::{build_router, AppState};
use crate::qr::QrRenderer;
use crate::service::ProfileService;
use crate::storage::open_store;

/// Open the configured backend and build handler state.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the backend cannot be
/// opened.
pub fn build_state(config: &Config) -> Result<AppState> {
    let addr = config.bind_addr()?;
    let store = open_store(config)?;
    let service = ProfileService::new(store, QrRenderer::from(&config.qr));

    Ok(AppState::new(
        service,
        config.public_url().map(str::to_string),
        format!("http://{addr}"),
    ))
}

/// Serve until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened, the address cannot be
/// bound, or the server fails.
pub async fn serve(config: Config) -> Result<()> {
    let state = build_state(&config)?;
    let addr = config.bind_addr()?;
    let listener = TcpListener::bind(addr).await?;

    info!(
        "Serving {} backend on http://{}",
        config.storage.backend,
        listener.local_addr()?
    );
    axum::serve(listener, build_router(state).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
