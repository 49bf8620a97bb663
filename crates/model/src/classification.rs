use crate::entity::EntityId;
use crate::source::{ReferenceSource, SourceKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Final category of a helper at report time.
///
/// Categories partition the helper universe: every helper lands in exactly
/// one, derived purely from its reference-source set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelperCategory {
    /// Referenced by at least one config file, template, or integration
    /// entry. Dashboard references alone never qualify.
    ActivelyUsed,

    /// Referenced by dashboards and by nothing else. Not safe to delete
    /// without review.
    DashboardOnly,

    /// Referenced by nothing.
    Orphaned,

    /// Attribute lookup failed for this entity; analysis was incomplete,
    /// so it is surfaced rather than silently dropped.
    Error,
}

impl HelperCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            HelperCategory::ActivelyUsed => "actively_used",
            HelperCategory::DashboardOnly => "dashboard_only",
            HelperCategory::Orphaned => "orphaned",
            HelperCategory::Error => "error",
        }
    }
}

/// Reference-source labels for one helper, partitioned by source kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRefs {
    pub config_files: BTreeSet<String>,
    pub templates: BTreeSet<String>,
    pub integration_entries: BTreeSet<String>,
    pub dashboards: BTreeSet<String>,
}

impl SourceRefs {
    pub fn insert(&mut self, source: &ReferenceSource) {
        let bucket = match source.kind {
            SourceKind::ConfigFile => &mut self.config_files,
            SourceKind::Template => &mut self.templates,
            SourceKind::IntegrationEntry => &mut self.integration_entries,
            SourceKind::Dashboard => &mut self.dashboards,
        };
        bucket.insert(source.label.clone());
    }

    /// Referenced by an automation surface (anything but a dashboard).
    pub fn has_automation_refs(&self) -> bool {
        !self.config_files.is_empty()
            || !self.templates.is_empty()
            || !self.integration_entries.is_empty()
    }

    pub fn has_dashboard_refs(&self) -> bool {
        !self.dashboards.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        !self.has_automation_refs() && !self.has_dashboard_refs()
    }
}

/// Reconciler output for one helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperClassification {
    pub entity_id: EntityId,
    pub category: HelperCategory,
    pub sources: SourceRefs,
}

impl HelperClassification {
    /// Derive the category from a partitioned source set. Pure function of
    /// the reference sets; the `error` pseudo-category is decided upstream
    /// from the attribute-lookup outcome, not here.
    pub fn categorize(sources: &SourceRefs) -> HelperCategory {
        if sources.has_automation_refs() {
            HelperCategory::ActivelyUsed
        } else if sources.has_dashboard_refs() {
            HelperCategory::DashboardOnly
        } else {
            HelperCategory::Orphaned
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_refs_never_make_actively_used() {
        let mut sources = SourceRefs::default();
        sources.insert(&ReferenceSource::dashboard("main.yaml"));
        sources.insert(&ReferenceSource::dashboard("energy.yaml"));
        assert_eq!(
            HelperClassification::categorize(&sources),
            HelperCategory::DashboardOnly
        );
    }

    #[test]
    fn automation_refs_dominate_dashboards() {
        let mut sources = SourceRefs::default();
        sources.insert(&ReferenceSource::dashboard("main.yaml"));
        sources.insert(&ReferenceSource::template("Water Flow Average"));
        assert_eq!(
            HelperClassification::categorize(&sources),
            HelperCategory::ActivelyUsed
        );
    }

    #[test]
    fn empty_sources_are_orphaned() {
        assert_eq!(
            HelperClassification::categorize(&SourceRefs::default()),
            HelperCategory::Orphaned
        );
    }
}
