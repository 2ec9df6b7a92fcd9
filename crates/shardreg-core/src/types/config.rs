use serde::{Deserialize, Serialize};

use super::{Membership, RecordSetDescriptor, RecordSetKey};
use crate::error::{RegistryError, Result};
use crate::shard::ShardId;

/// Default record type for registry entries
pub const DEFAULT_RECORD_TYPE: &str = "A";

/// Default TTL for registry entries, in seconds
pub const DEFAULT_TTL: u32 = 60;

/// Weight written on every registry record set
pub const DEFAULT_WEIGHT: u32 = 1;

/// Where and how a registry is stored.
///
/// Built once at startup and handed to the controller; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Registry record name that consumers resolve
    pub record_name: String,

    /// Record type of the registry entries
    #[serde(default = "default_record_type")]
    pub record_type: String,

    /// TTL of the registry entries in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Hosted zone holding the record sets
    pub zone_id: String,

    /// Routing weight for each shard's record set
    #[serde(default = "default_weight")]
    pub weight: u32,
}

impl RegistryConfig {
    /// Create a configuration with default type, TTL and weight
    #[must_use]
    pub fn new(record_name: impl Into<String>, zone_id: impl Into<String>) -> Self {
        Self {
            record_name: record_name.into(),
            record_type: default_record_type(),
            ttl: DEFAULT_TTL,
            zone_id: zone_id.into(),
            weight: DEFAULT_WEIGHT,
        }
    }

    /// Set the record type
    #[must_use]
    pub fn record_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = record_type.into();
        self
    }

    /// Set the TTL
    #[must_use]
    pub const fn ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Check that every required field is present
    pub fn validate(&self) -> Result<()> {
        if self.record_name.trim().is_empty() {
            return Err(RegistryError::Config("record name must not be empty".into()));
        }
        if self.zone_id.trim().is_empty() {
            return Err(RegistryError::Config("zone id must not be empty".into()));
        }
        if self.record_type.trim().is_empty() {
            return Err(RegistryError::Config("record type must not be empty".into()));
        }
        Ok(())
    }

    /// Key of the record set for a shard
    #[must_use]
    pub fn key(&self, shard: ShardId) -> RecordSetKey {
        RecordSetKey::new(self.record_name.clone(), shard)
    }

    /// The full record set to write for a shard holding `membership`
    #[must_use]
    pub fn record_set(&self, key: &RecordSetKey, membership: &Membership) -> RecordSetDescriptor {
        RecordSetDescriptor {
            name: self.record_name.clone(),
            record_type: self.record_type.clone(),
            ttl: self.ttl,
            set_identifier: Some(key.set_identifier()),
            weight: Some(self.weight),
            values: membership.to_values(),
        }
    }
}

fn default_record_type() -> String {
    String::from(DEFAULT_RECORD_TYPE)
}

const fn default_ttl() -> u32 {
    DEFAULT_TTL
}

const fn default_weight() -> u32 {
    DEFAULT_WEIGHT
}
