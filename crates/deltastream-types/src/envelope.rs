//! The normalized wire envelope delivered to stream observers.
//!
//! An [`Envelope`] serializes as `{"type": <kind>, "payload": {...}}`.
//! Byte values are rendered as UTF-8 text, with invalid sequences
//! replaced, so that browser clients can display them directly.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::event::EventKind;

/// Payload of a `participant_added` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantJoin {
    /// Participant name.
    pub node: String,
    /// Join time, as Unix epoch milliseconds on the wire.
    #[serde(serialize_with = "chrono::serde::ts_milliseconds::serialize")]
    pub time: DateTime<Utc>,
    /// Highest delta version the participant advertised.
    #[serde(rename = "mv")]
    pub max_version: i64,
}

/// Payload of a `participant_dead` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantFaulty {
    /// Participant name.
    pub node: String,
    /// Detection time, as Unix epoch milliseconds on the wire.
    #[serde(serialize_with = "chrono::serde::ts_milliseconds::serialize")]
    pub time: DateTime<Utc>,
    /// Last known network address.
    pub address: String,
}

/// Payload of a `delta_added` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeltaAdded {
    /// Delta group.
    pub group: String,
    /// Delta key.
    pub key: String,
    /// Value bytes.
    #[serde(serialize_with = "lossy_text")]
    pub value: Vec<u8>,
}

/// Payload of a `delta_updated` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeltaUpdated {
    /// Delta group.
    pub group: String,
    /// Delta key.
    pub key: String,
    /// Version after the update.
    pub version: i64,
    /// Version before the update.
    #[serde(rename = "from")]
    pub previous_version: i64,
    /// Value before the update.
    #[serde(serialize_with = "lossy_text")]
    pub previous_value: Vec<u8>,
    /// Value after the update.
    #[serde(serialize_with = "lossy_text")]
    pub value: Vec<u8>,
}

/// One normalized cluster event.
///
/// Immutable once built; each variant carries its own field set so that
/// consumers never inspect an untyped payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Envelope {
    /// A participant joined.
    ParticipantAdded(ParticipantJoin),
    /// A participant was marked faulty.
    ParticipantDead(ParticipantFaulty),
    /// A delta was added.
    DeltaAdded(DeltaAdded),
    /// A delta was updated.
    DeltaUpdated(DeltaUpdated),
}

impl Envelope {
    /// The kind tag of this envelope.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::ParticipantAdded(_) => EventKind::ParticipantAdded,
            Self::ParticipantDead(_) => EventKind::ParticipantDead,
            Self::DeltaAdded(_) => EventKind::DeltaAdded,
            Self::DeltaUpdated(_) => EventKind::DeltaUpdated,
        }
    }
}

fn lossy_text<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn participant_added_wire_shape() {
        let time = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let envelope = Envelope::ParticipantAdded(ParticipantJoin {
            node: String::from("node-b"),
            time,
            max_version: 7,
        });

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "participant_added",
                "payload": { "node": "node-b", "time": 1_700_000_000_123_i64, "mv": 7 }
            })
        );
        assert_eq!(envelope.kind(), EventKind::ParticipantAdded);
    }

    #[test]
    fn delta_updated_renders_values_as_text() {
        let envelope = Envelope::DeltaUpdated(DeltaUpdated {
            group: String::from("config"),
            key: String::from("color"),
            version: 12,
            previous_version: 11,
            previous_value: b"red\r\n".to_vec(),
            value: b"blue\r\n".to_vec(),
        });

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], "delta_updated");
        assert_eq!(value["payload"]["from"], 11);
        assert_eq!(value["payload"]["version"], 12);
        assert_eq!(value["payload"]["previous_value"], "red\r\n");
        assert_eq!(value["payload"]["value"], "blue\r\n");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let envelope = Envelope::DeltaAdded(DeltaAdded {
            group: String::from("g"),
            key: String::from("k"),
            value: vec![b'a', 0xff, b'b'],
        });

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["payload"]["value"], "a\u{fffd}b");
    }
}
