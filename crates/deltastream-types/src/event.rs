//! Event kinds and the raw notification payloads emitted by the engine.
//!
//! The engine reports four kinds of state change. Handlers are registered
//! per [`EventKind`] and receive an [`EngineEvent`], which is the engine's
//! own representation of the change before normalization.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of cluster state change an event describes.
///
/// Serialized in `snake_case`, which is also the `type` tag used on the
/// wire by [`Envelope`](crate::Envelope).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A new participant joined the cluster view.
    ParticipantAdded,
    /// A participant was marked faulty.
    ParticipantDead,
    /// A delta was recorded for a key that had none before.
    DeltaAdded,
    /// An existing delta was replaced by a newer version.
    DeltaUpdated,
}

impl EventKind {
    /// Every event kind, in registration order.
    pub const ALL: [Self; 4] = [
        Self::ParticipantAdded,
        Self::ParticipantDead,
        Self::DeltaAdded,
        Self::DeltaUpdated,
    ];

    /// The wire name of this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParticipantAdded => "participant_added",
            Self::ParticipantDead => "participant_dead",
            Self::DeltaAdded => "delta_added",
            Self::DeltaUpdated => "delta_updated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state-change notification as delivered by the cluster engine.
///
/// Field names follow the engine's vocabulary; the bridge maps them onto
/// the wire vocabulary of [`Envelope`](crate::Envelope).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// A participant joined.
    ParticipantJoined {
        /// Participant name.
        name: String,
        /// When the join was observed.
        time: DateTime<Utc>,
        /// Highest delta version the participant advertised.
        max_version: i64,
    },
    /// A participant was declared faulty.
    ParticipantFaulty {
        /// Participant name.
        name: String,
        /// When the failure was detected.
        time: DateTime<Utc>,
        /// Last known network address.
        address: String,
    },
    /// A delta was added.
    DeltaAdded {
        /// Delta group.
        group: String,
        /// Delta key within the group.
        key: String,
        /// Stored value bytes.
        value: Vec<u8>,
    },
    /// A delta was updated.
    DeltaUpdated {
        /// Delta group.
        group: String,
        /// Delta key within the group.
        key: String,
        /// Version after the update.
        current_version: i64,
        /// Version before the update.
        previous_version: i64,
        /// Value before the update.
        previous_value: Vec<u8>,
        /// Value after the update.
        current_value: Vec<u8>,
    },
}

impl EngineEvent {
    /// The kind this payload naturally belongs to.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ParticipantJoined { .. } => EventKind::ParticipantAdded,
            Self::ParticipantFaulty { .. } => EventKind::ParticipantDead,
            Self::DeltaAdded { .. } => EventKind::DeltaAdded,
            Self::DeltaUpdated { .. } => EventKind::DeltaUpdated,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_wire_names_match_serde() {
        for kind in EventKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_owned()));
        }
    }

    #[test]
    fn engine_event_reports_its_kind() {
        let event = EngineEvent::DeltaAdded {
            group: String::from("g"),
            key: String::from("k"),
            value: b"v".to_vec(),
        };
        assert_eq!(event.kind(), EventKind::DeltaAdded);
    }
}
