//! Bridge from engine notifications to queued envelopes.
//!
//! [`EventBridge::register`] installs one handler per [`EventKind`]. Each
//! handler normalizes the engine payload with [`normalize`] and publishes
//! the resulting [`Envelope`] to the shared queue.
//!
//! Handlers never fail and never block the engine's dispatch path. A
//! payload that does not match its registered kind is discarded and
//! counted in [`BridgeStats`]; a full queue discards the envelope and the
//! queue counts it.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use deltastream_types::{
    DeltaAdded, DeltaUpdated, EngineEvent, Envelope, EventKind, ParticipantFaulty,
    ParticipantJoin,
};
use tracing::info;

use crate::engine::{ClusterEngine, EngineError, EventHandler, HandlerId};
use crate::queue::EventQueue;

/// Convert an engine payload delivered for `kind` into an envelope.
///
/// Returns `None` when the payload's shape does not belong to `kind`.
pub fn normalize(kind: EventKind, event: &EngineEvent) -> Option<Envelope> {
    let envelope = match (kind, event) {
        (
            EventKind::ParticipantAdded,
            EngineEvent::ParticipantJoined {
                name,
                time,
                max_version,
            },
        ) => Envelope::ParticipantAdded(ParticipantJoin {
            node: name.clone(),
            time: *time,
            max_version: *max_version,
        }),
        (EventKind::ParticipantDead, EngineEvent::ParticipantFaulty { name, time, address }) => {
            Envelope::ParticipantDead(ParticipantFaulty {
                node: name.clone(),
                time: *time,
                address: address.clone(),
            })
        }
        (EventKind::DeltaAdded, EngineEvent::DeltaAdded { group, key, value }) => {
            Envelope::DeltaAdded(DeltaAdded {
                group: group.clone(),
                key: key.clone(),
                value: value.clone(),
            })
        }
        (
            EventKind::DeltaUpdated,
            EngineEvent::DeltaUpdated {
                group,
                key,
                current_version,
                previous_version,
                previous_value,
                current_value,
            },
        ) => Envelope::DeltaUpdated(DeltaUpdated {
            group: group.clone(),
            key: key.clone(),
            version: *current_version,
            previous_version: *previous_version,
            previous_value: previous_value.clone(),
            value: current_value.clone(),
        }),
        _ => return None,
    };
    Some(envelope)
}

/// Counters for events the bridge could not normalize.
#[derive(Debug, Default)]
pub struct BridgeStats {
    mismatched: AtomicU64,
}

impl BridgeStats {
    /// Number of payloads discarded because their shape did not match the
    /// kind they were delivered for.
    pub fn mismatched(&self) -> u64 {
        self.mismatched.load(Ordering::Relaxed)
    }

    fn record_mismatch(&self) {
        self.mismatched.fetch_add(1, Ordering::Relaxed);
    }
}

/// Wires engine notifications into an [`EventQueue`] of envelopes.
#[derive(Debug, Clone)]
pub struct EventBridge {
    queue: Arc<EventQueue<Envelope>>,
    stats: Arc<BridgeStats>,
}

impl EventBridge {
    /// Create a bridge publishing into `queue`.
    pub fn new(queue: Arc<EventQueue<Envelope>>) -> Self {
        Self {
            queue,
            stats: Arc::new(BridgeStats::default()),
        }
    }

    /// Shared mismatch counters.
    pub fn stats(&self) -> Arc<BridgeStats> {
        Arc::clone(&self.stats)
    }

    /// Register a handler for every [`EventKind`] with `engine`.
    ///
    /// # Errors
    ///
    /// Returns the first registration error reported by the engine.
    pub fn register(&self, engine: &dyn ClusterEngine) -> Result<Vec<HandlerId>, EngineError> {
        let mut ids = Vec::with_capacity(EventKind::ALL.len());
        for kind in EventKind::ALL {
            ids.push(engine.on_event(kind, self.handler(kind))?);
        }
        info!(handlers = ids.len(), "Event bridge registered");
        Ok(ids)
    }

    fn handler(&self, kind: EventKind) -> EventHandler {
        let queue = Arc::clone(&self.queue);
        let stats = Arc::clone(&self.stats);
        Arc::new(move |event: &EngineEvent| match normalize(kind, event) {
            Some(envelope) => {
                queue.publish(envelope);
            }
            None => stats.record_mismatch(),
        })
    }
}
