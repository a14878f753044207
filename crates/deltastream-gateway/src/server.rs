//! Gateway HTTP server lifecycle management.
//!
//! [`bind`] claims the listen address eagerly so a bad address fails
//! startup before any traffic is served. [`serve`] runs the router until
//! the shutdown future resolves, then closes the event queue so that open
//! event streams finish and graceful shutdown can complete.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use crate::router::build_router;
use crate::state::AppState;

/// Configuration for the gateway server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address (`host:port`).
    pub bind_addr: String,
    /// Directory of a prebuilt UI bundle, if any.
    pub ui_dir: Option<PathBuf>,
}

/// Bind the configured listen address.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be resolved or bound.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
    let listener = TcpListener::bind(config.bind_addr.as_str())
        .await
        .map_err(|e| ServerError::Bind(format!("bind failed on {}: {e}", config.bind_addr)))?;

    match listener.local_addr() {
        Ok(addr) => info!(%addr, "Gateway listening"),
        Err(_) => info!(addr = %config.bind_addr, "Gateway listening"),
    }
    Ok(listener)
}

/// Serve the gateway on `listener` until `shutdown` resolves.
///
/// On shutdown the event queue is closed first; in-flight requests and
/// open streams then drain before this returns.
///
/// # Errors
///
/// Returns [`ServerError::Serve`] if the server hits a fatal I/O error.
pub async fn serve<F>(
    listener: TcpListener,
    config: &ServerConfig,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Some(dir) = &config.ui_dir {
        info!(dir = %dir.display(), "Serving UI bundle");
    }

    let queue = Arc::clone(&state.queue);
    let router = build_router(state, config.ui_dir.as_deref());

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            shutdown.await;
            info!("Shutdown requested, closing event queue");
            queue.close();
        })
        .await
        .map_err(|e| ServerError::Serve(format!("serve error: {e}")))?;

    info!("Gateway stopped");
    Ok(())
}

/// Errors that can occur when starting or running the gateway server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind to the network address.
    #[error("bind error: {0}")]
    Bind(String),

    /// The server encountered a fatal error while serving.
    #[error("serve error: {0}")]
    Serve(String),
}
