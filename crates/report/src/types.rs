//! JSON report shapes. Field names are load-bearing: downstream deletion
//! tooling keys on them, so they are a fixed external schema.

use helper_audit_model::{
    EntityId, HelperCategory, HelperClassification, SourceRefs, StateStore,
};
use helper_audit_reconcile::ReconcileSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisTotals {
    pub total_helpers: usize,
    pub referenced_count: usize,
    pub dashboard_only_count: usize,
    pub orphaned_count: usize,
    pub error_count: usize,
    pub config_files_analyzed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperDetail {
    pub domain: String,
    pub state: String,
    pub category: HelperCategory,
    pub sources: SourceRefs,
}

/// The full machine-readable report written to `helper_analysis.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub analysis: AnalysisTotals,
    pub helpers: BTreeMap<String, HelperDetail>,
    pub referenced_helpers: Vec<String>,
    pub dashboard_only_helpers: Vec<String>,
    pub potentially_orphaned: Vec<String>,
    pub error_helpers: Vec<String>,
    pub config_files: Vec<String>,
}

impl AnalysisReport {
    pub fn build(
        classified: &BTreeMap<EntityId, HelperClassification>,
        summary: ReconcileSummary,
        store: &dyn StateStore,
        config_files: &[PathBuf],
    ) -> Self {
        let mut helpers = BTreeMap::new();
        let mut referenced_helpers = Vec::new();
        let mut dashboard_only_helpers = Vec::new();
        let mut potentially_orphaned = Vec::new();
        let mut error_helpers = Vec::new();

        for (entity_id, classification) in classified {
            let state = store
                .state(entity_id)
                .unwrap_or_else(|| "unavailable".to_string());
            helpers.insert(
                entity_id.to_string(),
                HelperDetail {
                    domain: entity_id.domain().to_string(),
                    state,
                    category: classification.category,
                    sources: classification.sources.clone(),
                },
            );
            let bucket = match classification.category {
                HelperCategory::ActivelyUsed => &mut referenced_helpers,
                HelperCategory::DashboardOnly => &mut dashboard_only_helpers,
                HelperCategory::Orphaned => &mut potentially_orphaned,
                HelperCategory::Error => &mut error_helpers,
            };
            bucket.push(entity_id.to_string());
        }

        Self {
            analysis: AnalysisTotals {
                total_helpers: summary.total,
                referenced_count: summary.actively_used,
                dashboard_only_count: summary.dashboard_only,
                orphaned_count: summary.orphaned,
                error_count: summary.error,
                config_files_analyzed: config_files.len(),
            },
            helpers,
            referenced_helpers,
            dashboard_only_helpers,
            potentially_orphaned,
            error_helpers,
            config_files: config_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        }
    }
}
