//! Deltastream node binary.
//!
//! Wires a local cluster engine to external observers: engine events are
//! normalized and streamed over `GET /events`, and `POST /api/delta`
//! writes flow back into the engine.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `deltastream.yaml` (or `DELTASTREAM_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the engine and the shared event queue
//! 4. Register the event bridge with the engine
//! 5. Start the engine
//! 6. Bind the gateway (fatal on failure)
//! 7. Serve until `Ctrl-C`, closing the event queue on the way out
//! 8. Stop the engine

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use deltastream_core::{
    ClusterEngine, DeltastreamConfig, EventBridge, EventQueue, LocalEngine, LogFormat,
    LoggingConfig,
};
use deltastream_gateway::{AppState, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::NodeError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "deltastream.yaml";

/// Application entry point for a Deltastream node.
///
/// # Errors
///
/// Returns an error if configuration, bridge registration, binding, or
/// serving fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config.logging);
    info!(
        node = config.node.name,
        node_addr = config.node.address,
        web_addr = config.web.bind_addr,
        queue_capacity = config.queue.capacity,
        "deltastream-node starting"
    );

    // 3. Create the engine and the event queue.
    let engine = Arc::new(LocalEngine::new(&config.node));
    let queue = Arc::new(EventQueue::new(config.queue.capacity));

    // 4. Register the event bridge before the engine produces anything.
    let bridge = EventBridge::new(Arc::clone(&queue));
    bridge.register(&*engine).map_err(NodeError::from)?;

    // 5. Start the engine.
    engine.start();

    // 6. Bind the gateway.
    let server_config = ServerConfig {
        bind_addr: config.web.bind_addr.clone(),
        ui_dir: config.web.ui_dir.clone(),
    };
    let listener = deltastream_gateway::bind(&server_config)
        .await
        .map_err(NodeError::from)?;

    // 7. Serve until shutdown.
    let state = Arc::new(AppState::new(
        engine.name(),
        Arc::clone(&queue),
        Arc::clone(&engine) as Arc<dyn ClusterEngine>,
        bridge.stats(),
    ));
    let served = deltastream_gateway::serve(listener, &server_config, state, shutdown_signal())
        .await
        .map_err(NodeError::from);

    // 8. Stop the engine, even if serving failed.
    queue.close();
    engine.stop();

    let stats = queue.stats();
    info!(
        published = stats.published,
        delivered = stats.delivered,
        dropped = stats.dropped,
        mismatched = bridge.stats().mismatched(),
        "deltastream-node shutdown complete"
    );

    served?;
    Ok(())
}

/// Load configuration from `DELTASTREAM_CONFIG` or `deltastream.yaml`.
///
/// A missing file yields defaults (with environment overrides applied).
fn load_config() -> Result<DeltastreamConfig, NodeError> {
    let path = std::env::var("DELTASTREAM_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if path.exists() {
        Ok(DeltastreamConfig::from_file(&path)?)
    } else {
        Ok(DeltastreamConfig::parse("")?)
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

/// Resolve when the process receives `Ctrl-C`.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
    }
}
