//! Record store abstraction.
//!
//! The registry keeps no state of its own; membership lives in weighted
//! record sets held by a DNS control plane. [`RecordStore`] is the seam
//! between the registration workflows and whatever control plane backs them.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::types::RecordSetDescriptor;

/// List, replace and delete record sets in a hosted zone.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Every record set in the zone, across all pages
    async fn list(&self, zone_id: &str) -> Result<Vec<RecordSetDescriptor>>;

    /// Create a record set or replace all of its values
    async fn upsert(&self, zone_id: &str, record_set: &RecordSetDescriptor) -> Result<()>;

    /// Delete a record set; it must match the stored one exactly
    async fn delete(&self, zone_id: &str, record_set: &RecordSetDescriptor) -> Result<()>;
}

#[async_trait]
impl<S: RecordStore + ?Sized> RecordStore for std::sync::Arc<S> {
    async fn list(&self, zone_id: &str) -> Result<Vec<RecordSetDescriptor>> {
        (**self).list(zone_id).await
    }

    async fn upsert(&self, zone_id: &str, record_set: &RecordSetDescriptor) -> Result<()> {
        (**self).upsert(zone_id, record_set).await
    }

    async fn delete(&self, zone_id: &str, record_set: &RecordSetDescriptor) -> Result<()> {
        (**self).delete(zone_id, record_set).await
    }
}

/// In-process record store with control-plane semantics.
///
/// Rejects empty record sets and deletes that do not match the stored
/// values, the same way a hosted DNS control plane does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    zones: Mutex<HashMap<String, Vec<RecordSetDescriptor>>>,
    changes: Mutex<u64>,
}

impl MemoryStore {
    /// Create a store with no zones
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one empty zone
    #[must_use]
    pub fn with_zone(zone_id: impl Into<String>) -> Self {
        let store = Self::new();
        store.add_zone(zone_id);
        store
    }

    /// Add an empty zone if it does not exist yet
    pub fn add_zone(&self, zone_id: impl Into<String>) {
        self.lock_zones().entry(zone_id.into()).or_default();
    }

    /// Store a record set directly, bypassing validation and change counting
    pub fn seed(&self, zone_id: &str, record_set: RecordSetDescriptor) {
        self.lock_zones()
            .entry(zone_id.to_string())
            .or_default()
            .push(record_set);
    }

    /// Snapshot of a zone's record sets
    #[must_use]
    pub fn record_sets(&self, zone_id: &str) -> Vec<RecordSetDescriptor> {
        self.lock_zones().get(zone_id).cloned().unwrap_or_default()
    }

    /// Number of changes applied through [`RecordStore`]
    #[must_use]
    pub fn change_count(&self) -> u64 {
        *self.changes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_zones(&self) -> MutexGuard<'_, HashMap<String, Vec<RecordSetDescriptor>>> {
        self.zones.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_change(&self) {
        *self.changes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }
}

fn no_such_zone(zone_id: &str) -> RegistryError {
    RegistryError::NotFound {
        resource: format!("hosted zone {zone_id}"),
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(&self, zone_id: &str) -> Result<Vec<RecordSetDescriptor>> {
        self.lock_zones()
            .get(zone_id)
            .cloned()
            .ok_or_else(|| no_such_zone(zone_id))
    }

    async fn upsert(&self, zone_id: &str, record_set: &RecordSetDescriptor) -> Result<()> {
        if record_set.values.is_empty() {
            return Err(RegistryError::InvalidChangeBatch(format!(
                "record set {} must have at least one value",
                record_set.name
            )));
        }

        {
            let mut zones = self.lock_zones();
            let sets = zones.get_mut(zone_id).ok_or_else(|| no_such_zone(zone_id))?;

            match sets.iter_mut().find(|rs| rs.same_record_set(record_set)) {
                Some(existing) => *existing = record_set.clone(),
                None => sets.push(record_set.clone()),
            }
        }

        debug!(zone = zone_id, name = %record_set.name, values = record_set.values.len(), "upserted record set");
        self.record_change();
        Ok(())
    }

    async fn delete(&self, zone_id: &str, record_set: &RecordSetDescriptor) -> Result<()> {
        {
            let mut zones = self.lock_zones();
            let sets = zones.get_mut(zone_id).ok_or_else(|| no_such_zone(zone_id))?;

            let index = sets
                .iter()
                .position(|rs| rs.same_record_set(record_set))
                .ok_or_else(|| {
                    RegistryError::InvalidChangeBatch(format!(
                        "record set {} ({:?}) not found",
                        record_set.name, record_set.set_identifier
                    ))
                })?;

            if sets[index] != *record_set {
                return Err(RegistryError::InvalidChangeBatch(format!(
                    "record set {} does not match the stored values",
                    record_set.name
                )));
            }

            sets.remove(index);
        }

        debug!(zone = zone_id, name = %record_set.name, "deleted record set");
        self.record_change();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_set(values: &[&str]) -> RecordSetDescriptor {
        RecordSetDescriptor {
            name: "svc.example.".into(),
            record_type: "A".into(),
            ttl: 60,
            set_identifier: Some("svc.example._65".into()),
            weight: Some(1),
            values: values.iter().map(ToString::to_string).collect(),
        }
    }

    #[tokio::test]
    async fn test_unknown_zone() {
        let store = MemoryStore::new();
        let err = store.list("Z404").await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_upsert_replaces_values() {
        let store = MemoryStore::with_zone("Z1");
        store.upsert("Z1", &record_set(&["10.0.0.5"])).await.unwrap();
        store
            .upsert("Z1", &record_set(&["10.0.0.5", "10.0.0.9"]))
            .await
            .unwrap();

        let sets = store.list("Z1").await.unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].values, vec!["10.0.0.5", "10.0.0.9"]);
        assert_eq!(store.change_count(), 2);
    }

    #[tokio::test]
    async fn test_upsert_rejects_empty_values() {
        let store = MemoryStore::with_zone("Z1");
        let err = store.upsert("Z1", &record_set(&[])).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidChangeBatch(_)));
        assert_eq!(store.change_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_requires_exact_match() {
        let store = MemoryStore::with_zone("Z1");
        store
            .upsert("Z1", &record_set(&["10.0.0.5", "10.0.0.9"]))
            .await
            .unwrap();

        let err = store.delete("Z1", &record_set(&["10.0.0.5"])).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidChangeBatch(_)));

        store
            .delete("Z1", &record_set(&["10.0.0.5", "10.0.0.9"]))
            .await
            .unwrap();
        assert!(store.list("Z1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_record_set() {
        let store = MemoryStore::with_zone("Z1");
        let err = store.delete("Z1", &record_set(&["10.0.0.5"])).await.unwrap_err();
        assert!(matches!(err, RegistryError::InvalidChangeBatch(_)));
    }

    #[tokio::test]
    async fn test_seed_is_not_counted() {
        let store = MemoryStore::new();
        store.seed("Z1", record_set(&["10.0.0.5"]));
        assert_eq!(store.record_sets("Z1").len(), 1);
        assert_eq!(store.change_count(), 0);
    }
}
