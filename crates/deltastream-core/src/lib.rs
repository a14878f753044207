//! Core of the Deltastream node: the bridge between cluster engine events
//! and external observers.
//!
//! # Modules
//!
//! - [`queue`] -- Bounded event queue with a non-blocking producer side
//! - [`engine`] -- The adapter trait through which the bridge talks to the engine
//! - [`local`] -- Single-node, in-memory engine implementing the adapter
//! - [`bridge`] -- Normalizes engine events into envelopes and queues them
//! - [`config`] -- Typed configuration loaded from YAML
//!
//! # Data flow
//!
//! The engine invokes the handlers registered by [`bridge::EventBridge`]
//! whenever cluster state changes. Each handler normalizes its payload into
//! an [`Envelope`](deltastream_types::Envelope) and publishes it to the
//! shared [`queue::EventQueue`], which never blocks the engine. HTTP stream
//! handlers drain the queue on the other side.

pub mod bridge;
pub mod config;
pub mod engine;
pub mod local;
pub mod queue;

pub use bridge::{BridgeStats, EventBridge, normalize};
pub use config::{
    ConfigError, DeltastreamConfig, LogFormat, LoggingConfig, NodeConfig, QueueConfig, WebConfig,
};
pub use engine::{ClusterEngine, EngineError, EventHandler, HandlerId};
pub use local::LocalEngine;
pub use queue::{DEFAULT_QUEUE_CAPACITY, EventQueue, PublishOutcome, QueueStats};
