//! REST handlers: the write gateway and the stats endpoint.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/delta` | Submit a delta to the engine |
//! | `GET` | `/api/stats` | Queue and bridge counters |

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use deltastream_core::QueueStats;
use deltastream_types::WriteRequest;
use tracing::{debug, info, warn};

use crate::error::GatewayError;
use crate::state::AppState;

/// Acknowledgement returned for an accepted write.
#[derive(Debug, serde::Serialize)]
struct WriteResponse {
    /// Always `true`.
    ok: bool,
}

/// Body of `GET /api/stats`.
#[derive(Debug, serde::Serialize)]
struct StatsResponse {
    /// Local node name.
    node: String,
    /// Event queue counters.
    queue: QueueStats,
    /// Engine payloads discarded during normalization.
    mismatched: u64,
}

// ---------------------------------------------------------------------------
// POST /api/delta
// ---------------------------------------------------------------------------

/// Submit a client write to the engine.
///
/// The body must be JSON with `Group`, `Key`, and `Value` strings. The
/// value is line-terminated and submitted as string content. The engine
/// call is the only suspension point; it is not retried and has no
/// timeout of its own.
pub async fn post_delta(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, GatewayError> {
    let request: WriteRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Rejected malformed write request");
        GatewayError::InvalidBody(e.to_string())
    })?;

    let record = request.into_record();
    let group = record.group.clone();
    let key = record.key.clone();

    let engine = Arc::clone(&state.engine);
    let outcome = tokio::task::spawn_blocking(move || engine.add_delta(record))
        .await
        .map_err(|e| GatewayError::Internal(format!("write task failed: {e}")))?;

    if let Err(e) = outcome {
        warn!(%group, %key, error = %e, "Engine rejected delta");
        return Err(e.into());
    }

    info!(%group, %key, "Delta submitted");
    Ok(Json(WriteResponse { ok: true }))
}

// ---------------------------------------------------------------------------
// GET /api/stats
// ---------------------------------------------------------------------------

/// Report event queue and bridge counters.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(StatsResponse {
        node: state.node.clone(),
        queue: state.queue.stats(),
        mismatched: state.bridge_stats.mismatched(),
    })
}
