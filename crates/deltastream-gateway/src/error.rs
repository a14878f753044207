//! Error types for the gateway's HTTP handlers.
//!
//! [`GatewayError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use deltastream_core::EngineError;

/// Errors that can occur in the gateway's HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The request body could not be parsed or lacks required fields.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The engine refused the write.
    #[error("engine rejected write: {0}")]
    Rejected(#[from] EngineError),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::InvalidBody(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // Engine rejections carry no detail beyond a generic failure.
            Self::Rejected(_) => (StatusCode::BAD_REQUEST, String::from("bad request")),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
