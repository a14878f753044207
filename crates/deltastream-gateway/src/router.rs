//! Axum router construction for the gateway.
//!
//! Assembles the stream, write, and stats routes into a single [`Router`]
//! with CORS and request tracing middleware.

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::http::header;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::sse;
use crate::state::AppState;

/// Build the complete Axum router for the gateway.
///
/// The router includes:
/// - `GET /events` -- server-sent event stream
/// - `POST /api/delta` -- submit a delta
/// - `GET /api/stats` -- queue and bridge counters
///
/// When `ui_dir` is given, every other path is served from that directory.
/// CORS allows any origin so a separately hosted UI can connect.
pub fn build_router(state: Arc<AppState>, ui_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT]);

    let router = Router::new()
        .route("/events", get(sse::stream_events))
        .route("/api/delta", post(handlers::post_delta))
        .route("/api/stats", get(handlers::get_stats));

    let router = match ui_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
