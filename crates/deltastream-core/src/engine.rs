//! The narrow interface between the bridge and the cluster engine.
//!
//! The bridge needs exactly two things from an engine: a way to register
//! for state-change notifications, and a way to submit writes. Any engine
//! implementing [`ClusterEngine`] can sit behind the gateway.

use std::fmt;
use std::sync::Arc;

use deltastream_types::{DeltaRecord, EngineEvent, EventKind};

/// Callback invoked by the engine for every event of a registered kind.
///
/// Handlers may run on the engine's own dispatch threads and must return
/// quickly without blocking on I/O.
pub type EventHandler = Arc<dyn Fn(&EngineEvent) + Send + Sync>;

/// Identifier returned for a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandlerId(pub u64);

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler-{}", self.0)
    }
}

/// Failures reported by an engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The delta was rejected by engine validation.
    #[error("invalid delta: {0}")]
    Validation(String),

    /// The value exceeds the engine's size limit.
    #[error("delta value of {size} bytes exceeds limit of {limit} bytes")]
    Capacity {
        /// Size of the rejected value in bytes.
        size: usize,
        /// Maximum accepted size in bytes.
        limit: usize,
    },

    /// The engine is not started, or has been stopped.
    #[error("engine is not running")]
    NotRunning,
}

/// Operations the bridge consumes from a cluster engine.
pub trait ClusterEngine: Send + Sync {
    /// Register `handler` to be called for every event of `kind`.
    fn on_event(&self, kind: EventKind, handler: EventHandler) -> Result<HandlerId, EngineError>;

    /// Submit a delta to the cluster.
    ///
    /// Synchronous; returns once the engine has accepted or rejected it.
    fn add_delta(&self, delta: DeltaRecord) -> Result<(), EngineError>;
}
