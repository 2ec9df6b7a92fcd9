use serde::Serialize;
use std::net::Ipv4Addr;

use crate::error::{RegistryError, Result};

/// The addresses currently advertised in one shard.
///
/// Keeps first-seen order and never holds the same address twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Membership(Vec<Ipv4Addr>);

impl Membership {
    /// Create an empty membership
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Parse stored record values, dropping repeats.
    ///
    /// Fails on any value that is not an IPv4 address; rewriting a shard
    /// without it would discard data this registry does not own.
    pub fn from_values<I, S>(set_identifier: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut membership = Self::new();
        for value in values {
            let raw = value.as_ref();
            let address = raw
                .trim()
                .parse::<Ipv4Addr>()
                .map_err(|_| RegistryError::InvalidRecord {
                    set_identifier: set_identifier.to_string(),
                    value: raw.to_string(),
                })?;
            membership.insert(address);
        }
        Ok(membership)
    }

    /// Returns true if the address is a member
    #[must_use]
    pub fn contains(&self, address: Ipv4Addr) -> bool {
        self.0.contains(&address)
    }

    /// Returns true if the address is the only member
    #[must_use]
    pub fn is_sole_member(&self, address: Ipv4Addr) -> bool {
        self.0.len() == 1 && self.0[0] == address
    }

    /// Append an address; returns false if it was already present
    pub fn insert(&mut self, address: Ipv4Addr) -> bool {
        if self.contains(address) {
            return false;
        }
        self.0.push(address);
        true
    }

    /// Remove an address; returns false if it was absent
    pub fn remove(&mut self, address: Ipv4Addr) -> bool {
        let before = self.0.len();
        self.0.retain(|member| *member != address);
        self.0.len() != before
    }

    /// Number of members
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no members
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over members in stored order
    pub fn iter(&self) -> impl Iterator<Item = &Ipv4Addr> {
        self.0.iter()
    }

    /// Render as record values
    #[must_use]
    pub fn to_values(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl FromIterator<Ipv4Addr> for Membership {
    fn from_iter<T: IntoIterator<Item = Ipv4Addr>>(iter: T) -> Self {
        let mut membership = Self::new();
        for address in iter {
            membership.insert(address);
        }
        membership
    }
}

impl<'a> IntoIterator for &'a Membership {
    type Item = &'a Ipv4Addr;
    type IntoIter = std::slice::Iter<'a, Ipv4Addr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
