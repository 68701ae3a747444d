//! Turning source submissions into index documents.

use crate::types::Submission;
use serde_json::{Map, Value};

/// Top-level ODK form metadata keys dropped from every payload.
pub const METADATA_KEYS: [&str; 7] = [
    "@id",
    "@version",
    "@xmlns:h",
    "@xmlns:ev",
    "@xmlns:jr",
    "@xmlns:orx",
    "@xmlns:xsd",
];

const ID_PREFIX: &str = "uuid:";

/// Removes the known metadata keys from a payload.
///
/// Shallow: nested objects keep whatever keys they carry.
pub fn strip_metadata(payload: &Map<String, Value>) -> Map<String, Value> {
    payload
        .iter()
        .filter(|(key, _)| !METADATA_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Derives the index document id from an instance identifier.
///
/// `"uuid:abc-123"` becomes `"abc-123"`; anything else is returned as is.
pub fn document_id(instance_id: &str) -> &str {
    instance_id.strip_prefix(ID_PREFIX).unwrap_or(instance_id)
}

/// A submission ready to be written to the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    pub id: String,
    /// Identifier as the source reported it, kept for log lines.
    pub instance_id: String,
    pub body: Map<String, Value>,
}

impl IndexedDocument {
    /// Strips the payload and unwraps it from its envelope.
    ///
    /// Returns `None` when the submission carries no identifier at all.
    pub fn from_submission(submission: &Submission) -> Option<Self> {
        let instance_id = submission.instance_id()?;
        Some(Self {
            id: document_id(instance_id).to_string(),
            instance_id: instance_id.to_string(),
            body: strip_metadata(&submission.payload),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn test_strip_metadata_removes_only_known_keys() {
        let raw = payload(json!({
            "@id": "form_a",
            "@version": "3",
            "@xmlns:h": "http://www.w3.org/1999/xhtml",
            "@xmlns:ev": "x",
            "@xmlns:jr": "x",
            "@xmlns:orx": "x",
            "@xmlns:xsd": "x",
            "@xmlns:custom": "kept",
            "name": "Alice",
            "meta": { "instanceID": "uuid:1" }
        }));
        let stripped = strip_metadata(&raw);
        let mut keys: Vec<&str> = stripped.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["@xmlns:custom", "meta", "name"]);
    }

    #[test]
    fn test_strip_metadata_is_shallow_and_idempotent() {
        let raw = payload(json!({
            "@id": "form_a",
            "group": { "@id": "nested", "answer": 4 }
        }));
        let once = strip_metadata(&raw);
        assert_eq!(once["group"]["@id"], "nested");
        assert_eq!(strip_metadata(&once), once);
    }

    #[test]
    fn test_document_id_strips_uuid_prefix() {
        assert_eq!(document_id("uuid:abc-123"), "abc-123");
        assert_eq!(document_id("abc-123"), "abc-123");
        assert_eq!(document_id("urn:uuid:abc"), "urn:uuid:abc");
        assert_eq!(document_id("uuid:uuid:abc"), "uuid:abc");
    }

    #[test]
    fn test_from_submission_unwraps_payload() {
        let submission: Submission = serde_json::from_value(json!({
            "id": 12,
            "created": "2018-05-01T10:00:00Z",
            "payload": { "@version": "1", "q1": "yes" },
            "meta": { "instanceID": "uuid:abc-123" }
        }))
        .unwrap();
        let doc = IndexedDocument::from_submission(&submission).unwrap();
        assert_eq!(doc.id, "abc-123");
        assert_eq!(doc.instance_id, "uuid:abc-123");
        assert_eq!(Value::Object(doc.body), json!({ "q1": "yes" }));
    }

    #[test]
    fn test_from_submission_without_identifier() {
        let submission: Submission =
            serde_json::from_value(json!({ "payload": { "q1": "no" } })).unwrap();
        assert!(IndexedDocument::from_submission(&submission).is_none());
    }
}
