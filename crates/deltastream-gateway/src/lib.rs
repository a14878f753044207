//! HTTP gateway for a Deltastream node.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **Event stream** (`GET /events`) pushing normalized cluster events as
//!   server-sent events, one frame per envelope
//! - **Write endpoint** (`POST /api/delta`) forwarding client mutations
//!   into the cluster engine
//! - **Stats endpoint** (`GET /api/stats`) reporting queue and bridge counters
//! - **Static UI** (optional) served for every other path
//!
//! # Architecture
//!
//! All stream connections drain the same [`EventQueue`]. The queue has
//! single-consumer semantics: with several open streams each envelope is
//! delivered to exactly one of them. Closing the queue ends every stream,
//! which is how shutdown reaches open connections.
//!
//! [`EventQueue`]: deltastream_core::EventQueue

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod sse;
pub mod state;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, bind, serve};
pub use state::AppState;
