use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shard::ShardId;

/// Identifies one shard's record set among all shards of a registry name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordSetKey {
    /// Registry record name (e.g. `svc.example.`)
    pub record_name: String,

    /// Shard the record set holds
    pub shard: ShardId,
}

impl RecordSetKey {
    /// Create a key for a record name and shard
    #[must_use]
    pub fn new(record_name: impl Into<String>, shard: ShardId) -> Self {
        Self {
            record_name: record_name.into(),
            shard,
        }
    }

    /// The set identifier the control plane stores this key under
    #[must_use]
    pub fn set_identifier(&self) -> String {
        format!("{}_{}", self.record_name, self.shard)
    }
}

impl fmt::Display for RecordSetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.set_identifier())
    }
}

/// A record set as listed from, or written to, the control plane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSetDescriptor {
    /// Owner name of the record set
    pub name: String,

    /// Record type (A, AAAA, TXT, ...)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Time to live in seconds
    pub ttl: u32,

    /// Distinguishes weighted record sets sharing one name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,

    /// Routing weight for weighted record sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,

    /// Record values in stored order
    #[serde(default)]
    pub values: Vec<String>,
}

impl RecordSetDescriptor {
    /// Returns true if this record set is stored under the given key
    #[must_use]
    pub fn is_keyed_by(&self, key: &RecordSetKey) -> bool {
        self.set_identifier.as_deref() == Some(key.set_identifier().as_str())
    }

    /// Returns true if both descriptors address the same stored record set
    #[must_use]
    pub fn same_record_set(&self, other: &Self) -> bool {
        self.name == other.name
            && self.record_type == other.record_type
            && self.set_identifier == other.set_identifier
    }
}

/// Kind of change applied to a record set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeAction {
    /// Create the record set, or replace all of its values
    Upsert,
    /// Delete the record set; values must match what is stored
    Delete,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Upsert => write!(f, "UPSERT"),
            Self::Delete => write!(f, "DELETE"),
        }
    }
}

/// One change within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// What to do
    pub action: ChangeAction,

    /// The record set to apply it to
    pub record_set: RecordSetDescriptor,
}

/// A batch of changes submitted to a zone in one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    /// Free-form comment stored with the change
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Changes applied together
    pub changes: Vec<Change>,
}

impl ChangeBatch {
    /// Build a batch holding a single change
    #[must_use]
    pub fn single(action: ChangeAction, record_set: RecordSetDescriptor) -> Self {
        Self {
            comment: None,
            changes: vec![Change { action, record_set }],
        }
    }

    /// Attach a comment
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Propagation status of a submitted change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeStatus {
    /// Accepted, not yet on every authoritative server
    Pending,
    /// Visible on every authoritative server
    Insync,
}

/// Receipt for a submitted change batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    /// Change identifier
    pub id: String,

    /// Propagation status
    pub status: ChangeStatus,

    /// When the control plane accepted the change
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// One page of a zone listing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSetPage {
    /// Record sets on this page
    #[serde(default)]
    pub record_sets: Vec<RecordSetDescriptor>,

    /// Continuation token for the next page, if any
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shard(n: u32) -> ShardId {
        ShardId::new(n).unwrap()
    }

    #[test]
    fn test_set_identifier() {
        let key = RecordSetKey::new("svc.example.", shard(65));
        assert_eq!(key.set_identifier(), "svc.example._65");
        assert_eq!(key.to_string(), "svc.example._65");
    }

    #[test]
    fn test_descriptor_wire_format() {
        let json = r#"{
            "name": "svc.example.",
            "type": "A",
            "ttl": 60,
            "set_identifier": "svc.example._65",
            "weight": 1,
            "values": ["10.0.0.5"]
        }"#;
        let rs: RecordSetDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(rs.record_type, "A");
        assert!(rs.is_keyed_by(&RecordSetKey::new("svc.example.", shard(65))));
        assert!(!rs.is_keyed_by(&RecordSetKey::new("svc.example.", shard(6))));
    }

    #[test]
    fn test_plain_record_set_has_no_key() {
        let json = r#"{"name": "example.", "type": "NS", "ttl": 172800, "values": ["ns1."]}"#;
        let rs: RecordSetDescriptor = serde_json::from_str(json).unwrap();
        assert!(rs.set_identifier.is_none());
        assert!(!rs.is_keyed_by(&RecordSetKey::new("example.", shard(0))));

        let out = serde_json::to_value(&rs).unwrap();
        assert!(out.get("set_identifier").is_none());
        assert!(out.get("weight").is_none());
    }

    #[test]
    fn test_change_batch_serialization() {
        let rs = RecordSetDescriptor {
            name: "svc.example.".into(),
            record_type: "A".into(),
            ttl: 60,
            set_identifier: Some("svc.example._65".into()),
            weight: Some(1),
            values: vec!["10.0.0.5".into()],
        };
        let batch = ChangeBatch::single(ChangeAction::Delete, rs).with_comment("bye");
        let json = serde_json::to_value(&batch).unwrap();
        assert_eq!(json["comment"], "bye");
        assert_eq!(json["changes"][0]["action"], "DELETE");
        assert_eq!(json["changes"][0]["record_set"]["type"], "A");
    }

    #[test]
    fn test_change_info_parsing() {
        let json = r#"{"id": "C123", "status": "PENDING", "submitted_at": "2024-03-01T12:00:00Z"}"#;
        let info: ChangeInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.status, ChangeStatus::Pending);
        assert!(info.submitted_at.is_some());
    }
}
