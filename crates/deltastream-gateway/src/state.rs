//! Shared application state for the gateway.
//!
//! [`AppState`] is wrapped in [`Arc`] and injected via Axum's `State`
//! extractor. It holds the one process-wide event queue, the engine the
//! write path submits to, and the bridge counters reported by the stats
//! endpoint.

use std::sync::Arc;

use deltastream_core::{BridgeStats, ClusterEngine, EventQueue};
use deltastream_types::Envelope;

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// Name of the local node, reported by the stats endpoint.
    pub node: String,
    /// Queue drained by every event stream connection.
    pub queue: Arc<EventQueue<Envelope>>,
    /// Engine receiving writes from `POST /api/delta`.
    pub engine: Arc<dyn ClusterEngine>,
    /// Normalization counters from the event bridge.
    pub bridge_stats: Arc<BridgeStats>,
}

impl AppState {
    /// Create the gateway state.
    pub fn new(
        node: impl Into<String>,
        queue: Arc<EventQueue<Envelope>>,
        engine: Arc<dyn ClusterEngine>,
        bridge_stats: Arc<BridgeStats>,
    ) -> Self {
        Self {
            node: node.into(),
            queue,
            engine,
            bridge_stats,
        }
    }
}
