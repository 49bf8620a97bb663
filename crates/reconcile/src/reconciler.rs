use helper_audit_model::{
    EntityId, HelperCandidate, HelperCategory, HelperClassification, RefGraph, SourceRefs,
};
use std::collections::BTreeMap;

/// Aggregate counts over one reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub total: usize,
    pub actively_used: usize,
    pub dashboard_only: usize,
    pub orphaned: usize,
    pub error: usize,
}

impl ReconcileSummary {
    fn count(&mut self, category: HelperCategory) {
        self.total += 1;
        match category {
            HelperCategory::ActivelyUsed => self.actively_used += 1,
            HelperCategory::DashboardOnly => self.dashboard_only += 1,
            HelperCategory::Orphaned => self.orphaned += 1,
            HelperCategory::Error => self.error += 1,
        }
    }
}

/// Classify every helper from its reference-source set.
///
/// Pure function of the inputs: the categories partition the helper
/// universe, and re-running on unchanged inputs yields an identical map.
pub fn reconcile(
    helpers: &[HelperCandidate],
    graph: &RefGraph,
) -> (BTreeMap<EntityId, HelperClassification>, ReconcileSummary) {
    let mut classified = BTreeMap::new();
    let mut summary = ReconcileSummary::default();

    for helper in helpers {
        let mut sources = SourceRefs::default();
        for source in graph.sources_for(&helper.entity_id) {
            sources.insert(&source);
        }

        // A helper whose attribute lookup failed is surfaced as incomplete
        // analysis rather than silently dropped or called orphaned.
        let category = if helper.attributes.is_none() {
            HelperCategory::Error
        } else {
            HelperClassification::categorize(&sources)
        };
        summary.count(category);

        classified.insert(
            helper.entity_id.clone(),
            HelperClassification {
                entity_id: helper.entity_id.clone(),
                category,
                sources,
            },
        );
    }

    log::info!(
        "Reconciled {} helpers: {} actively used, {} dashboard-only, {} orphaned, {} errors",
        summary.total,
        summary.actively_used,
        summary.dashboard_only,
        summary.orphaned,
        summary.error
    );
    (classified, summary)
}
