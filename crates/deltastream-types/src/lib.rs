//! Shared type definitions for the Deltastream event bridge.
//!
//! This crate is the single source of truth for the types that cross the
//! boundary between the cluster engine, the bridge core, and HTTP clients.
//!
//! # Modules
//!
//! - [`event`] -- Event kinds and the raw payloads the engine delivers
//! - [`envelope`] -- The normalized wire envelope pushed to observers
//! - [`delta`] -- Write requests and the delta records submitted to the engine

pub mod delta;
pub mod envelope;
pub mod event;

// Re-export all public types at crate root for convenience.
pub use delta::{ContentType, DeltaRecord, LINE_TERMINATOR, WriteRequest};
pub use envelope::{DeltaAdded, DeltaUpdated, Envelope, ParticipantFaulty, ParticipantJoin};
pub use event::{EngineEvent, EventKind};
