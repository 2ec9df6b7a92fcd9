//! Registration and deregistration workflows.
//!
//! Both workflows are read-modify-write cycles against the shard's record
//! set: list the zone, compute the new value set, write it back. The control
//! plane offers no conditional write, so nothing ties the write to the read.
//! When two nodes in the same shard change membership at the same time, the
//! later write replaces the earlier one and that node's change is lost. This
//! is accepted: sharding keeps the number of nodes contending for one record
//! set small, and membership changes are rare compared to the record TTL.
//! A node that must be certain of its membership re-reads with
//! [`RegistrationController::members`] and re-runs the workflow.
//!
//! Every store call goes through the [`RetryExecutor`]. Exhausted retries
//! surface as [`RegistryError::RetryBudgetExhausted`]; nothing is swallowed.

use serde::Serialize;
use shardreg_client::{RetryConfig, RetryExecutor};
use shardreg_core::{
    shard, Membership, RecordSetDescriptor, RecordSetKey, RecordStore, RegistryConfig,
    RegistryError, Result, ShardId,
};
use std::fmt;
use std::net::Ipv4Addr;
use tracing::{debug, info, warn};

/// Result of a successful add
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOutcome {
    /// The address was written into its shard
    Registered,
    /// The address was already a member; nothing was written
    AlreadyRegistered,
}

/// Result of a successful remove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoveOutcome {
    /// The address was dropped and the remaining members written back
    Removed,
    /// The address was the last member, so the record set was deleted
    RecordDeleted,
    /// The address was not a member; nothing was written
    NotRegistered,
}

impl fmt::Display for AddOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::AlreadyRegistered => write!(f, "already registered"),
        }
    }
}

impl fmt::Display for RemoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Removed => write!(f, "removed"),
            Self::RecordDeleted => write!(f, "removed, record set deleted"),
            Self::NotRegistered => write!(f, "not registered"),
        }
    }
}

/// Current contents of one shard as read from the store
struct ShardView {
    key: RecordSetKey,
    membership: Membership,
    stored: Vec<RecordSetDescriptor>,
}

/// Runs add/remove workflows for one registry against a [`RecordStore`]
pub struct RegistrationController<S> {
    store: S,
    config: RegistryConfig,
    retry: RetryExecutor,
}

impl<S: RecordStore> RegistrationController<S> {
    /// Create a controller with the default retry policy
    pub fn new(store: S, config: RegistryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            retry: RetryExecutor::default(),
        })
    }

    /// Replace the retry policy
    #[must_use]
    pub const fn with_retry(mut self, config: RetryConfig) -> Self {
        self.retry = RetryExecutor::new(config);
        self
    }

    /// The registry configuration
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Key of the record set an address belongs in
    #[must_use]
    pub fn key_for(&self, address: Ipv4Addr) -> RecordSetKey {
        self.config.key(shard::assign(address))
    }

    /// Current members of the shard an address belongs in
    pub async fn members(&self, address: Ipv4Addr) -> Result<Membership> {
        self.members_of(shard::assign(address)).await
    }

    /// Current members of a shard
    pub async fn members_of(&self, shard: ShardId) -> Result<Membership> {
        Ok(self.read_shard(shard).await?.membership)
    }

    /// Register an address in its shard
    pub async fn add(&self, address: Ipv4Addr) -> Result<AddOutcome> {
        let shard = shard::assign(address);
        let mut view = self.read_shard(shard).await?;

        info!(
            %address,
            zone = %self.config.zone_id,
            record = %self.config.record_name,
            shard = %shard,
            members = view.membership.len(),
            "registering"
        );

        if !view.membership.insert(address) {
            info!(%address, shard = %shard, "address already registered");
            return Ok(AddOutcome::AlreadyRegistered);
        }

        let record_set = self.config.record_set(&view.key, &view.membership);
        self.upsert(&record_set).await?;

        info!(%address, set = %view.key, members = view.membership.len(), "registered");
        Ok(AddOutcome::Registered)
    }

    /// Deregister an address from its shard
    pub async fn remove(&self, address: Ipv4Addr) -> Result<RemoveOutcome> {
        let shard = shard::assign(address);
        let mut view = self.read_shard(shard).await?;

        info!(
            %address,
            zone = %self.config.zone_id,
            record = %self.config.record_name,
            shard = %shard,
            members = view.membership.len(),
            "deregistering"
        );

        if view.membership.is_sole_member(address) {
            info!(%address, set = %view.key, "last member, deleting record set");
            for record_set in &view.stored {
                self.delete(record_set).await?;
            }
            return Ok(RemoveOutcome::RecordDeleted);
        }

        if !view.membership.remove(address) {
            info!(%address, shard = %shard, "address not present in record set");
            return Ok(RemoveOutcome::NotRegistered);
        }

        let record_set = self.config.record_set(&view.key, &view.membership);
        self.upsert(&record_set).await?;
        self.strip_from_others(address, &record_set, &view.stored).await?;

        info!(%address, set = %view.key, members = view.membership.len(), "deregistered");
        Ok(RemoveOutcome::Removed)
    }

    /// List the zone and collect the record sets stored under a shard's key
    async fn read_shard(&self, shard: ShardId) -> Result<ShardView> {
        let key = self.config.key(shard);
        let set_identifier = key.set_identifier();
        let store = &self.store;
        let zone_id = self.config.zone_id.as_str();

        let listing = self
            .retry
            .run("list", move || store.list(zone_id))
            .await?;

        let stored: Vec<RecordSetDescriptor> = listing
            .into_iter()
            .filter(|rs| rs.is_keyed_by(&key))
            .collect();

        if stored.len() > 1 {
            warn!(set = %set_identifier, count = stored.len(), "multiple record sets share one set identifier");
        }

        let membership = Membership::from_values(
            &set_identifier,
            stored.iter().flat_map(|rs| rs.values.iter()),
        )?;

        debug!(set = %set_identifier, members = membership.len(), "read shard");
        Ok(ShardView {
            key,
            membership,
            stored,
        })
    }

    /// Drop an address from stored record sets that share the identifier
    /// but are not the one just written.
    async fn strip_from_others(
        &self,
        address: Ipv4Addr,
        written: &RecordSetDescriptor,
        stored: &[RecordSetDescriptor],
    ) -> Result<()> {
        for other in stored.iter().filter(|rs| !rs.same_record_set(written)) {
            let remaining: Vec<String> = other
                .values
                .iter()
                .filter(|value| value.trim().parse::<Ipv4Addr>().ok() != Some(address))
                .cloned()
                .collect();

            if remaining.len() == other.values.len() {
                continue;
            }

            debug!(%address, record_type = %other.record_type, "removing from sibling record set");
            if remaining.is_empty() {
                self.delete(other).await?;
            } else {
                self.upsert(&RecordSetDescriptor {
                    values: remaining,
                    ..other.clone()
                })
                .await?;
            }
        }
        Ok(())
    }

    async fn upsert(&self, record_set: &RecordSetDescriptor) -> Result<()> {
        if record_set.values.is_empty() {
            return Err(RegistryError::InvalidChangeBatch(
                "refusing to write an empty record set".into(),
            ));
        }

        let store = &self.store;
        let zone_id = self.config.zone_id.as_str();
        self.retry
            .run("upsert", move || store.upsert(zone_id, record_set))
            .await
    }

    async fn delete(&self, record_set: &RecordSetDescriptor) -> Result<()> {
        let store = &self.store;
        let zone_id = self.config.zone_id.as_str();
        self.retry
            .run("delete", move || store.delete(zone_id, record_set))
            .await
    }
}
