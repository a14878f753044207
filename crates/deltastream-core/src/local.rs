//! Single-node, in-memory engine.
//!
//! [`LocalEngine`] keeps the latest version of every delta in memory and
//! emits the same notifications a clustered engine would: `delta_added` on
//! the first write of a key, `delta_updated` on later writes, and
//! participant events when nodes join or fail. Membership gossip is not
//! modelled; [`LocalEngine::join_participant`] and
//! [`LocalEngine::mark_faulty`] are the seams through which membership
//! changes are reported.
//!
//! Handlers run synchronously on the caller's thread after the store lock
//! has been released.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::Utc;
use deltastream_types::{ContentType, DeltaRecord, EngineEvent, EventKind};
use tracing::{debug, info};

use crate::config::NodeConfig;
use crate::engine::{ClusterEngine, EngineError, EventHandler, HandlerId};

#[derive(Debug, Clone)]
struct StoredDelta {
    version: i64,
    value: Vec<u8>,
}

/// In-memory engine for a single node.
pub struct LocalEngine {
    name: String,
    address: String,
    max_value_bytes: usize,
    running: AtomicBool,
    next_handler_id: AtomicU64,
    handlers: RwLock<HashMap<EventKind, Vec<(HandlerId, EventHandler)>>>,
    store: Mutex<BTreeMap<(String, String), StoredDelta>>,
    /// Held from the store update through dispatch so handlers observe
    /// writes in version order. Handlers must not call `add_delta`.
    dispatch_order: Mutex<()>,
}

impl LocalEngine {
    /// Create a stopped engine for the configured node.
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            name: config.name.clone(),
            address: config.address.clone(),
            max_value_bytes: config.max_value_bytes,
            running: AtomicBool::new(false),
            next_handler_id: AtomicU64::new(1),
            handlers: RwLock::new(HashMap::new()),
            store: Mutex::new(BTreeMap::new()),
            dispatch_order: Mutex::new(()),
        }
    }

    /// Name of the local node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start accepting writes and announce the local node as a participant.
    ///
    /// Calling `start` on a running engine has no effect.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::AcqRel) {
            return;
        }
        info!(node = %self.name, address = %self.address, "Engine started");
        self.join_participant(&self.name, self.max_version());
    }

    /// Stop accepting writes. Registered handlers are kept.
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::AcqRel) {
            info!(node = %self.name, "Engine stopped");
        }
    }

    /// Whether the engine currently accepts writes.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Report that a participant joined.
    pub fn join_participant(&self, name: &str, max_version: i64) {
        self.dispatch(&EngineEvent::ParticipantJoined {
            name: name.to_owned(),
            time: Utc::now(),
            max_version,
        });
    }

    /// Report that a participant was declared faulty.
    pub fn mark_faulty(&self, name: &str, address: &str) {
        self.dispatch(&EngineEvent::ParticipantFaulty {
            name: name.to_owned(),
            time: Utc::now(),
            address: address.to_owned(),
        });
    }

    /// Current version and value of a delta, if present.
    pub fn get(&self, group: &str, key: &str) -> Option<(i64, Vec<u8>)> {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        store
            .get(&(group.to_owned(), key.to_owned()))
            .map(|d| (d.version, d.value.clone()))
    }

    /// Highest delta version held by this node, or 0 when empty.
    pub fn max_version(&self) -> i64 {
        let store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        store.values().map(|d| d.version).max().unwrap_or(0)
    }

    fn validate(&self, delta: &DeltaRecord) -> Result<(), EngineError> {
        if delta.group.is_empty() {
            return Err(EngineError::Validation("group must not be empty".to_owned()));
        }
        if delta.key.is_empty() {
            return Err(EngineError::Validation("key must not be empty".to_owned()));
        }
        if delta.value.len() > self.max_value_bytes {
            return Err(EngineError::Capacity {
                size: delta.value.len(),
                limit: self.max_value_bytes,
            });
        }
        if delta.content_type == ContentType::String && std::str::from_utf8(&delta.value).is_err()
        {
            return Err(EngineError::Validation(
                "string delta is not valid UTF-8".to_owned(),
            ));
        }
        Ok(())
    }

    fn dispatch(&self, event: &EngineEvent) {
        let handlers: Vec<EventHandler> = {
            let registry = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            registry
                .get(&event.kind())
                .map(|list| list.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };
        for handler in handlers {
            handler(event);
        }
    }
}

impl ClusterEngine for LocalEngine {
    fn on_event(&self, kind: EventKind, handler: EventHandler) -> Result<HandlerId, EngineError> {
        let id = HandlerId(self.next_handler_id.fetch_add(1, Ordering::Relaxed));
        let mut registry = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        registry.entry(kind).or_default().push((id, handler));
        debug!(%kind, %id, "Event handler registered");
        Ok(id)
    }

    fn add_delta(&self, delta: DeltaRecord) -> Result<(), EngineError> {
        if !self.is_running() {
            return Err(EngineError::NotRunning);
        }
        self.validate(&delta)?;

        let DeltaRecord {
            group, key, value, ..
        } = delta;
        let _ordered = self
            .dispatch_order
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now_ms = Utc::now().timestamp_millis();

        let event = {
            let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
            match store.get_mut(&(group.clone(), key.clone())) {
                Some(existing) => {
                    let previous_version = existing.version;
                    let version = previous_version.saturating_add(1).max(now_ms);
                    let previous_value = std::mem::replace(&mut existing.value, value.clone());
                    existing.version = version;
                    EngineEvent::DeltaUpdated {
                        group,
                        key,
                        current_version: version,
                        previous_version,
                        previous_value,
                        current_value: value,
                    }
                }
                None => {
                    store.insert(
                        (group.clone(), key.clone()),
                        StoredDelta {
                            version: now_ms,
                            value: value.clone(),
                        },
                    );
                    EngineEvent::DeltaAdded { group, key, value }
                }
            }
        };

        self.dispatch(&event);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use deltastream_types::Envelope;

    use super::*;
    use crate::bridge::EventBridge;
    use crate::queue::EventQueue;

    fn engine() -> LocalEngine {
        LocalEngine::new(&NodeConfig {
            max_value_bytes: 16,
            ..NodeConfig::default()
        })
    }

    fn record(group: &str, key: &str, value: &str) -> DeltaRecord {
        DeltaRecord {
            group: group.to_owned(),
            key: key.to_owned(),
            content_type: ContentType::String,
            value: value.as_bytes().to_vec(),
        }
    }

    fn capture(engine: &LocalEngine, kind: EventKind) -> Arc<Mutex<Vec<EngineEvent>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine
            .on_event(
                kind,
                Arc::new(move |event: &EngineEvent| sink.lock().unwrap().push(event.clone())),
            )
            .unwrap();
        seen
    }

    #[test]
    fn writes_rejected_until_started() {
        let engine = engine();
        assert_eq!(
            engine.add_delta(record("g", "k", "v")),
            Err(EngineError::NotRunning)
        );
        engine.start();
        assert!(engine.add_delta(record("g", "k", "v")).is_ok());
        engine.stop();
        assert_eq!(
            engine.add_delta(record("g", "k", "v")),
            Err(EngineError::NotRunning)
        );
    }

    #[test]
    fn start_announces_local_participant_once() {
        let engine = engine();
        let joined = capture(&engine, EventKind::ParticipantAdded);
        engine.start();
        engine.start();

        let joined = joined.lock().unwrap();
        assert_eq!(joined.len(), 1);
        assert!(matches!(
            &joined[0],
            EngineEvent::ParticipantJoined { name, .. } if name == "node-a"
        ));
    }

    #[test]
    fn first_write_adds_and_later_write_updates() {
        let engine = engine();
        let added = capture(&engine, EventKind::DeltaAdded);
        let updated = capture(&engine, EventKind::DeltaUpdated);
        engine.start();

        engine.add_delta(record("g", "k", "one")).unwrap();
        engine.add_delta(record("g", "k", "two")).unwrap();

        assert_eq!(added.lock().unwrap().len(), 1);
        let updated = updated.lock().unwrap();
        assert_eq!(updated.len(), 1);
        match &updated[0] {
            EngineEvent::DeltaUpdated {
                current_version,
                previous_version,
                previous_value,
                current_value,
                ..
            } => {
                assert!(current_version > previous_version);
                assert_eq!(previous_value, b"one");
                assert_eq!(current_value, b"two");
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(engine.get("g", "k").unwrap().1, b"two");
    }

    #[test]
    fn rejects_empty_group_and_oversized_values() {
        let engine = engine();
        engine.start();

        assert!(matches!(
            engine.add_delta(record("", "k", "v")),
            Err(EngineError::Validation(_))
        ));
        assert_eq!(
            engine.add_delta(record("g", "k", "this value is far too long")),
            Err(EngineError::Capacity { size: 26, limit: 16 })
        );
        assert!(engine.get("g", "k").is_none());
    }

    #[test]
    fn rejects_non_utf8_string_values() {
        let engine = engine();
        engine.start();

        let mut bad = record("g", "k", "");
        bad.value = vec![0xff, 0xfe];
        assert!(matches!(engine.add_delta(bad.clone()), Err(EngineError::Validation(_))));

        bad.content_type = ContentType::Bytes;
        assert!(engine.add_delta(bad).is_ok());
    }

    #[test]
    fn faulty_participant_is_reported() {
        let engine = engine();
        let dead = capture(&engine, EventKind::ParticipantDead);
        engine.mark_faulty("node-c", "10.0.0.3:8081");

        let dead = dead.lock().unwrap();
        assert!(matches!(
            &dead[0],
            EngineEvent::ParticipantFaulty { address, .. } if address == "10.0.0.3:8081"
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_updates_stream_in_version_order() {
        const WRITERS: usize = 8;
        const WRITES: usize = 500;

        let engine = Arc::new(engine());
        let queue = Arc::new(EventQueue::new(WRITERS * WRITES + 1));
        EventBridge::new(Arc::clone(&queue)).register(&*engine).unwrap();
        engine.start();

        let writers: Vec<_> = (0..WRITERS)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    for _ in 0..WRITES {
                        engine.add_delta(record("g", "k", "v")).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        queue.close();

        let mut added = 0;
        let mut last: Option<i64> = None;
        let mut updates = 0;
        while let Some(envelope) = queue.drain().await {
            match envelope {
                Envelope::DeltaAdded(_) => {
                    assert_eq!(updates, 0);
                    added += 1;
                }
                Envelope::DeltaUpdated(updated) => {
                    if let Some(previous) = last {
                        assert_eq!(updated.previous_version, previous);
                    }
                    assert!(updated.version > updated.previous_version);
                    last = Some(updated.version);
                    updates += 1;
                }
                Envelope::ParticipantAdded(_) | Envelope::ParticipantDead(_) => {}
            }
        }
        assert_eq!(added, 1);
        assert_eq!(updates, WRITERS * WRITES - 1);
    }
}
