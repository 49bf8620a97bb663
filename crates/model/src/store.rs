use crate::entity::{Attributes, EntityId};
use crate::error::{ModelError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

/// Current value and attributes of one entity.
#[derive(Debug, Clone, Default)]
pub struct EntityState {
    pub value: String,
    pub attributes: Attributes,
}

/// Live entity/state table, injected at the process boundary.
///
/// The analyzer only reads entity ids, values, and attributes; `set_state`
/// exists so the run can surface its own status entity back into the host.
pub trait StateStore: Send + Sync {
    /// All known entity identifiers.
    fn entity_ids(&self) -> Vec<EntityId>;

    /// Current value, or `None` when the entity does not exist.
    fn state(&self, entity: &EntityId) -> Option<String>;

    /// Attribute mapping for an entity. `Err` means the lookup itself
    /// failed (vanished entity, backend error), which downstream treats
    /// fail-closed.
    fn attributes(&self, entity: &EntityId) -> Result<Attributes>;

    /// Overwrite an entity's value and attributes.
    fn set_state(&self, entity: &EntityId, value: &str, attributes: Attributes) -> Result<()>;
}

/// In-memory state table for tests and snapshot-free runs.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    inner: RwLock<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    entities: BTreeMap<EntityId, EntityState>,
    failing: BTreeSet<EntityId>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, entity: EntityId, value: impl Into<String>, attributes: Attributes) {
        let mut inner = self.inner.write().expect("state store lock poisoned");
        inner.entities.insert(
            entity,
            EntityState {
                value: value.into(),
                attributes,
            },
        );
    }

    /// Make subsequent attribute lookups for `entity` fail, simulating a
    /// vanished entity or backend error.
    pub fn fail_attributes(&self, entity: EntityId) {
        let mut inner = self.inner.write().expect("state store lock poisoned");
        inner.failing.insert(entity);
    }
}

impl StateStore for MemoryStateStore {
    fn entity_ids(&self) -> Vec<EntityId> {
        let inner = self.inner.read().expect("state store lock poisoned");
        inner.entities.keys().cloned().collect()
    }

    fn state(&self, entity: &EntityId) -> Option<String> {
        let inner = self.inner.read().expect("state store lock poisoned");
        inner.entities.get(entity).map(|s| s.value.clone())
    }

    fn attributes(&self, entity: &EntityId) -> Result<Attributes> {
        let inner = self.inner.read().expect("state store lock poisoned");
        if inner.failing.contains(entity) {
            return Err(ModelError::AttributeLookup(entity.to_string()));
        }
        inner
            .entities
            .get(entity)
            .map(|s| s.attributes.clone())
            .ok_or_else(|| ModelError::AttributeLookup(entity.to_string()))
    }

    fn set_state(&self, entity: &EntityId, value: &str, attributes: Attributes) -> Result<()> {
        let mut inner = self.inner.write().expect("state store lock poisoned");
        inner.entities.insert(
            entity.clone(),
            EntityState {
                value: value.to_string(),
                attributes,
            },
        );
        Ok(())
    }
}
