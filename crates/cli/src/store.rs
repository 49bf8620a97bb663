//! File-backed state store: loads a JSON snapshot of the live entity/state
//! table (the REST API `states` shape) and persists status write-backs into
//! the same file.

use anyhow::{Context, Result};
use helper_audit_model::{Attributes, EntityId, EntityState, ModelError, StateStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    entity_id: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    attributes: Attributes,
}

/// StateStore over a states-snapshot JSON file.
pub struct JsonStateStore {
    path: PathBuf,
    entities: RwLock<BTreeMap<EntityId, EntityState>>,
}

impl JsonStateStore {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("cannot read states snapshot {}", path.display()))?;
        let snapshot: Vec<SnapshotEntry> = serde_json::from_str(&raw)
            .with_context(|| format!("malformed states snapshot {}", path.display()))?;

        let mut entities = BTreeMap::new();
        for entry in snapshot {
            match EntityId::parse(&entry.entity_id) {
                Ok(entity_id) => {
                    entities.insert(
                        entity_id,
                        EntityState {
                            value: entry.state,
                            attributes: entry.attributes,
                        },
                    );
                }
                Err(err) => log::warn!("Skipping snapshot entry: {err}"),
            }
        }
        log::info!(
            "Loaded {} entities from {}",
            entities.len(),
            path.display()
        );
        Ok(Self {
            path,
            entities: RwLock::new(entities),
        })
    }

    /// Full-overwrite persistence of the snapshot, including any status
    /// entities set during the run.
    fn persist(&self, entities: &BTreeMap<EntityId, EntityState>) -> Result<(), ModelError> {
        let snapshot: Vec<SnapshotEntry> = entities
            .iter()
            .map(|(entity_id, state)| SnapshotEntry {
                entity_id: entity_id.to_string(),
                state: state.value.clone(),
                attributes: state.attributes.clone(),
            })
            .collect();
        let raw = serde_json::to_string_pretty(&snapshot)
            .map_err(|err| ModelError::Store(err.to_string()))?;
        fs::write(&self.path, raw).map_err(|err| {
            ModelError::Store(format!("cannot write {}: {err}", self.path.display()))
        })
    }
}

impl StateStore for JsonStateStore {
    fn entity_ids(&self) -> Vec<EntityId> {
        let entities = self.entities.read().expect("state store lock poisoned");
        entities.keys().cloned().collect()
    }

    fn state(&self, entity: &EntityId) -> Option<String> {
        let entities = self.entities.read().expect("state store lock poisoned");
        entities.get(entity).map(|s| s.value.clone())
    }

    fn attributes(&self, entity: &EntityId) -> Result<Attributes, ModelError> {
        let entities = self.entities.read().expect("state store lock poisoned");
        entities
            .get(entity)
            .map(|s| s.attributes.clone())
            .ok_or_else(|| ModelError::AttributeLookup(entity.to_string()))
    }

    fn set_state(
        &self,
        entity: &EntityId,
        value: &str,
        attributes: Attributes,
    ) -> Result<(), ModelError> {
        let mut entities = self.entities.write().expect("state store lock poisoned");
        entities.insert(
            entity.clone(),
            EntityState {
                value: value.to_string(),
                attributes,
            },
        );
        self.persist(&entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn id(raw: &str) -> EntityId {
        EntityId::parse(raw).unwrap()
    }

    #[test]
    fn loads_snapshot_and_skips_bad_entries() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("states.json");
        fs::write(
            &path,
            r#"[
                {"entity_id": "timer.laundry", "state": "idle",
                 "attributes": {"friendly_name": "Laundry"}},
                {"entity_id": "not-an-entity-id", "state": "x"}
            ]"#,
        )
        .unwrap();

        let store = JsonStateStore::load(&path).unwrap();
        assert_eq!(store.entity_ids(), vec![id("timer.laundry")]);
        assert_eq!(store.state(&id("timer.laundry")).as_deref(), Some("idle"));
        assert!(store.attributes(&id("timer.gone")).is_err());
    }

    #[test]
    fn set_state_persists_back_to_the_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("states.json");
        fs::write(&path, "[]").unwrap();

        let store = JsonStateStore::load(&path).unwrap();
        store
            .set_state(
                &id("sensor.helper_analysis_status"),
                "complete",
                Attributes::new(),
            )
            .unwrap();

        let reloaded = JsonStateStore::load(&path).unwrap();
        assert_eq!(
            reloaded
                .state(&id("sensor.helper_analysis_status"))
                .as_deref(),
            Some("complete")
        );
    }

    #[test]
    fn malformed_snapshot_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("states.json");
        fs::write(&path, "{\"not\": \"an array\"").unwrap();
        assert!(JsonStateStore::load(&path).is_err());
    }
}
