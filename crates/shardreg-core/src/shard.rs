//! Address-to-shard assignment.
//!
//! Members are spread across a fixed number of record sets so no single set
//! grows without bound. The shard is derived from the address alone, so every
//! node computes the same shard for the same address without coordination.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Number of shards a registry name is partitioned into.
pub const SHARD_COUNT: u32 = 100;

/// Index of one shard, always in `0..SHARD_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ShardId(u8);

impl ShardId {
    /// Create a shard id, returning `None` when out of range
    #[must_use]
    pub const fn new(index: u32) -> Option<Self> {
        if index < SHARD_COUNT {
            #[allow(clippy::cast_possible_truncation)]
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// The shard index
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0 as u32
    }
}

impl fmt::Display for ShardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for ShardId {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("shard {value} out of range 0..{SHARD_COUNT}"))
    }
}

impl From<ShardId> for u32 {
    fn from(shard: ShardId) -> Self {
        shard.get()
    }
}

/// Compute the shard for an address.
///
/// The dotted quad is read as a big-endian `u32` and reduced modulo
/// [`SHARD_COUNT`].
#[must_use]
pub const fn assign(address: Ipv4Addr) -> ShardId {
    let value = u32::from_be_bytes(address.octets());
    #[allow(clippy::cast_possible_truncation)]
    ShardId((value % SHARD_COUNT) as u8)
}
