//! Write requests and the delta records submitted to the engine.

use serde::{Deserialize, Serialize};

/// Terminator appended to every textual value before it is stored.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// How the engine should interpret a delta's value bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// UTF-8 text.
    String,
    /// Opaque bytes.
    Bytes,
}

/// A single key/value mutation handed to the engine's write path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaRecord {
    /// Delta group.
    pub group: String,
    /// Delta key within the group.
    pub key: String,
    /// Interpretation of `value`.
    pub content_type: ContentType,
    /// Value bytes.
    pub value: Vec<u8>,
}

/// Body of `POST /api/delta`.
///
/// Field names are capitalized on the wire; the lower-case spellings used
/// by browser clients are accepted as aliases. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WriteRequest {
    /// Target group.
    #[serde(rename = "Group", alias = "group")]
    pub group: String,
    /// Target key.
    #[serde(rename = "Key", alias = "key")]
    pub key: String,
    /// Textual value.
    #[serde(rename = "Value", alias = "value")]
    pub value: String,
}

impl WriteRequest {
    /// Convert into a string-typed delta record, terminating the value
    /// with [`LINE_TERMINATOR`].
    pub fn into_record(self) -> DeltaRecord {
        let mut value = self.value.into_bytes();
        value.extend_from_slice(LINE_TERMINATOR);
        DeltaRecord {
            group: self.group,
            key: self.key,
            content_type: ContentType::String,
            value,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn record_value_is_line_terminated() {
        let request: WriteRequest =
            serde_json::from_str(r#"{"Group":"g","Key":"k","Value":"v"}"#).unwrap();
        let record = request.into_record();
        assert_eq!(record.group, "g");
        assert_eq!(record.key, "k");
        assert_eq!(record.value, b"v\r\n");
        assert_eq!(record.content_type, ContentType::String);
    }

    #[test]
    fn lower_case_fields_are_accepted() {
        let request: WriteRequest =
            serde_json::from_str(r#"{"group":"g","key":"k","value":"hello"}"#).unwrap();
        assert_eq!(request.value, "hello");
    }

    #[test]
    fn missing_field_is_rejected() {
        let result = serde_json::from_str::<WriteRequest>(r#"{"Group":"g","Key":"k"}"#);
        assert!(result.is_err());
    }
}
