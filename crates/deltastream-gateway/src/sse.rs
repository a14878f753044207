//! Server-sent event stream of normalized cluster events.
//!
//! Clients connect to `GET /events` and receive one frame per envelope,
//! `data: <json>\n\n`, flushed as soon as it is dequeued. The stream ends
//! when the event queue is closed or the client goes away.
//!
//! Every connection drains the same shared queue, so envelopes are
//! partitioned across concurrent connections rather than broadcast: each
//! one is delivered to exactly one stream.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::sse::{Event, Sse};
use futures::StreamExt;
use futures::stream;
use tracing::{debug, warn};

use crate::state::AppState;

/// Logs the end of a stream, whichever side ended it.
struct Connection;

impl Drop for Connection {
    fn drop(&mut self) {
        debug!("Event stream client disconnected");
    }
}

/// Open a server-sent event stream over the shared event queue.
///
/// # Route
///
/// `GET /events`
pub async fn stream_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Event stream client connected");

    let queue = Arc::clone(&state.queue);
    let envelopes = stream::unfold((queue, Connection), |(queue, connection)| async move {
        let envelope = queue.drain().await?;
        Some((envelope, (queue, connection)))
    });

    let frames = envelopes.filter_map(|envelope| async move {
        match serde_json::to_string(&envelope) {
            Ok(json) => Some(Ok::<_, Infallible>(Event::default().data(json))),
            Err(e) => {
                warn!(kind = %envelope.kind(), "Failed to serialize envelope: {e}");
                None
            }
        }
    });

    ([(header::CONNECTION, "keep-alive")], Sse::new(frames))
}
