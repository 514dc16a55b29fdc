//! Persisted bindings
//!
//! - [`BindingStore`] - persistence collaborator used by the reconciler
//! - [`MemoryStore`] - lock-free in-memory store with a revision serial
//! - [`StateFile`] - JSON snapshot of a store on disk
//!
//! The serial moves once per saved binding and never on reads, so an
//! unchanged serial across two passes proves nothing was written.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::declaration::EntityRef;
use crate::error::Result;
use crate::provider::ProviderKind;
use crate::reconciler::Binding;

/// What is kept between passes for one entity
///
/// Only the `(kind, resolved_id)` pair is persisted. The discriminator is
/// declaration data and is re-read on every pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBinding {
    pub kind: ProviderKind,
    pub resolved_id: String,
}

impl From<&Binding> for StoredBinding {
    fn from(binding: &Binding) -> Self {
        Self {
            kind: binding.kind,
            resolved_id: binding.resolved_id.clone(),
        }
    }
}

/// Persistence for computed bindings
pub trait BindingStore: Send + Sync {
    /// Last binding saved for `entity`
    fn load(&self, entity: &EntityRef) -> Result<Option<StoredBinding>>;

    /// Replace whatever is stored for `binding.entity`
    fn save(&self, binding: &Binding) -> Result<()>;
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    bindings: DashMap<EntityRef, StoredBinding>,
    serial: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Revision counter, bumped on every save
    pub fn serial(&self) -> u64 {
        self.serial.load(Ordering::SeqCst)
    }

    pub fn get(&self, entity: &EntityRef) -> Option<StoredBinding> {
        self.bindings.get(entity).map(|b| b.clone())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Restore a store from a snapshot
    pub fn from_state(state: StateFile) -> Self {
        Self {
            bindings: state.bindings.into_iter().collect(),
            serial: AtomicU64::new(state.serial),
        }
    }

    /// Ordered snapshot for writing to disk
    pub fn to_state(&self) -> StateFile {
        StateFile {
            serial: self.serial(),
            bindings: self
                .bindings
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        }
    }
}

impl BindingStore for MemoryStore {
    fn load(&self, entity: &EntityRef) -> Result<Option<StoredBinding>> {
        Ok(self.get(entity))
    }

    fn save(&self, binding: &Binding) -> Result<()> {
        self.bindings.insert(binding.entity.clone(), StoredBinding::from(binding));
        self.serial.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// On-disk state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default)]
    pub serial: u64,
    #[serde(default)]
    pub bindings: BTreeMap<EntityRef, StoredBinding>,
}

impl StateFile {
    /// Read state from `path`; a missing file is an empty state
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn binding(entity: EntityRef, id: &str) -> Binding {
        Binding {
            entity,
            kind: ProviderKind::GitLab,
            resolved_id: id.to_string(),
            discriminator: "infra".to_string(),
        }
    }

    #[test]
    fn save_bumps_serial_load_does_not() {
        let store = MemoryStore::new();
        let entity = EntityRef::stack("api");

        assert_eq!(store.load(&entity).unwrap(), None);
        store.save(&binding(entity.clone(), "g1")).unwrap();
        assert_eq!(store.serial(), 1);

        let stored = store.load(&entity).unwrap().unwrap();
        assert_eq!(stored.resolved_id, "g1");
        assert_eq!(store.serial(), 1);
    }

    #[test]
    fn state_file_round_trip_through_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");

        let store = MemoryStore::new();
        store.save(&binding(EntityRef::stack("api"), "g1")).unwrap();
        store.save(&binding(EntityRef::module("vpc"), "g2")).unwrap();
        store.to_state().save(&path).unwrap();

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"stack.api\""));
        assert!(json.contains("\"resolved_id\": \"g2\""));
        assert!(!json.contains("infra"), "discriminator must not be persisted");

        let restored = MemoryStore::from_state(StateFile::load(&path).unwrap());
        assert_eq!(restored.serial(), 2);
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get(&EntityRef::module("vpc")).unwrap().resolved_id, "g2");
    }

    #[test]
    fn legacy_discriminator_field_is_ignored() {
        let json = r#"{
            "serial": 7,
            "bindings": {
                "stack.api": {
                    "kind": "azure_devops",
                    "resolved_id": "ado-1",
                    "discriminator": "old"
                }
            }
        }"#;
        let state: StateFile = serde_json::from_str(json).unwrap();

        let stored = &state.bindings[&EntityRef::stack("api")];
        assert_eq!(stored.kind, ProviderKind::AzureDevOps);
        assert_eq!(stored.resolved_id, "ado-1");
    }

    #[test]
    fn missing_state_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let state = StateFile::load(&temp_dir.path().join("absent.json")).unwrap();

        assert_eq!(state, StateFile::default());
    }

    #[test]
    fn corrupt_state_file_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = StateFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("VCS-091"));
    }
}
