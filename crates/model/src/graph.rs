use crate::entity::EntityId;
use crate::source::{ReferenceEdge, ReferenceSource};
use std::collections::{BTreeMap, BTreeSet};

/// Provenance graph of reference edges, built monotonically during a run
/// and queried by the reconciler.
///
/// Edges are deduplicated and kept in sorted order so that an unchanged
/// corpus always reconciles to an identical report.
#[derive(Debug, Default, Clone)]
pub struct RefGraph {
    edges: BTreeSet<ReferenceEdge>,

    /// Entity -> sources mentioning it, for fast reconciliation lookup.
    by_entity: BTreeMap<EntityId, BTreeSet<ReferenceSource>>,

    sources: BTreeSet<ReferenceSource>,
}

impl RefGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `source` references every entity in `entities`.
    pub fn add_source_refs<I>(&mut self, source: &ReferenceSource, entities: I)
    where
        I: IntoIterator<Item = EntityId>,
    {
        self.sources.insert(source.clone());
        for entity in entities {
            self.by_entity
                .entry(entity.clone())
                .or_default()
                .insert(source.clone());
            self.edges.insert(ReferenceEdge {
                source: source.clone(),
                entity,
            });
        }
    }

    /// Sources whose text mentions `entity` (empty set when unreferenced).
    pub fn sources_for(&self, entity: &EntityId) -> BTreeSet<ReferenceSource> {
        self.by_entity.get(entity).cloned().unwrap_or_default()
    }

    pub fn referenced_entities(&self) -> impl Iterator<Item = &EntityId> {
        self.by_entity.keys()
    }

    pub fn edges(&self) -> impl Iterator<Item = &ReferenceEdge> {
        self.edges.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }
}
