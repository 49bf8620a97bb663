use crate::error::{ReportError, Result};
use crate::types::AnalysisReport;
use helper_audit_model::{Attributes, EntityId, StateStore};
use std::fs;
use std::path::{Path, PathBuf};

/// Entity the run's status is surfaced through.
pub const STATUS_ENTITY_ID: &str = "sensor.helper_analysis_status";

const JSON_REPORT: &str = "helper_analysis.json";
const ORPHANED_LIST: &str = "truly_orphaned_helpers.txt";
const DASHBOARD_LIST: &str = "dashboard_only_helpers.txt";
const SUMMARY: &str = "helper_summary.txt";
const REVIEW_DASHBOARD: &str = "orphaned_helpers_dashboard.yaml";

/// Which output files made it to disk. Failed writes are logged and left
/// as `None`; the run itself never fails over a single file.
#[derive(Debug, Default)]
pub struct EmitOutcome {
    pub json_report: Option<PathBuf>,
    pub orphaned_list: Option<PathBuf>,
    pub dashboard_list: Option<PathBuf>,
    pub summary: Option<PathBuf>,
    pub review_dashboard: Option<PathBuf>,
    pub status_updated: bool,
}

/// Writes all analysis outputs under a fixed results directory,
/// full-overwrite per run.
pub struct ReportEmitter {
    results_dir: PathBuf,
}

impl ReportEmitter {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Emit every output, attempting each file independently, then surface
    /// the status entity through the state store.
    pub fn emit(&self, report: &AnalysisReport, store: &dyn StateStore) -> EmitOutcome {
        if let Err(err) = fs::create_dir_all(&self.results_dir) {
            log::error!(
                "Failed to create results directory {}: {err}",
                self.results_dir.display()
            );
        }

        let mut outcome = EmitOutcome {
            json_report: self.attempt(JSON_REPORT, || self.write_json(report)),
            orphaned_list: self.attempt(ORPHANED_LIST, || self.write_orphaned_list(report)),
            dashboard_list: self.attempt(DASHBOARD_LIST, || self.write_dashboard_list(report)),
            summary: self.attempt(SUMMARY, || self.write_summary(report)),
            review_dashboard: self.attempt(REVIEW_DASHBOARD, || self.write_review_dashboard(report)),
            status_updated: false,
        };

        match self.update_status(report, store, &outcome) {
            Ok(()) => outcome.status_updated = true,
            Err(err) => log::warn!("Failed to update status entity: {err}"),
        }
        outcome
    }

    fn attempt(&self, name: &str, write: impl FnOnce() -> Result<()>) -> Option<PathBuf> {
        match write() {
            Ok(()) => Some(self.results_dir.join(name)),
            Err(err) => {
                log::error!("Failed to write {name}: {err}");
                None
            }
        }
    }

    fn write_json(&self, report: &AnalysisReport) -> Result<()> {
        let content = serde_json::to_string_pretty(report)?;
        self.write_file(JSON_REPORT, &content)
    }

    fn write_orphaned_list(&self, report: &AnalysisReport) -> Result<()> {
        let mut content = String::new();
        content.push_str("# Truly Orphaned Helpers\n");
        content.push_str(&format!(
            "# Found {} helpers with no references anywhere (dashboards included)\n",
            report.potentially_orphaned.len()
        ));
        content.push_str("# Edit this file to remove helpers you want to keep,\n");
        content.push_str("# then run `helper-audit preview` to plan deletion\n\n");
        for helper in &report.potentially_orphaned {
            content.push_str(helper);
            content.push('\n');
        }
        self.write_file(ORPHANED_LIST, &content)
    }

    fn write_dashboard_list(&self, report: &AnalysisReport) -> Result<()> {
        let mut content = String::new();
        content.push_str("# Dashboard-Only Helpers\n");
        content.push_str(&format!(
            "# {} helpers referenced only by dashboards - review before deleting\n\n",
            report.dashboard_only_helpers.len()
        ));
        for helper in &report.dashboard_only_helpers {
            content.push_str(helper);
            content.push('\n');
        }
        self.write_file(DASHBOARD_LIST, &content)
    }

    fn write_summary(&self, report: &AnalysisReport) -> Result<()> {
        let totals = &report.analysis;
        let mut content = String::new();
        content.push_str("Helper Analysis Summary\n");
        content.push_str(&"=".repeat(50));
        content.push_str("\n\n");
        content.push_str(&format!("Total helpers analyzed: {}\n", totals.total_helpers));
        content.push_str(&format!(
            "Helpers with automation references: {}\n",
            totals.referenced_count
        ));
        content.push_str(&format!(
            "Dashboard-only helpers: {}\n",
            totals.dashboard_only_count
        ));
        content.push_str(&format!("Potentially orphaned: {}\n", totals.orphaned_count));
        content.push_str(&format!("Analysis errors: {}\n", totals.error_count));
        content.push_str(&format!(
            "Configuration files analyzed: {}\n\n",
            totals.config_files_analyzed
        ));

        push_section(
            &mut content,
            "POTENTIALLY ORPHANED HELPERS:",
            &report.potentially_orphaned,
        );
        push_section(
            &mut content,
            "DASHBOARD-ONLY HELPERS (review before deleting):",
            &report.dashboard_only_helpers,
        );
        push_section(
            &mut content,
            "HELPERS WITH REFERENCES (first 10):",
            &report.referenced_helpers[..report.referenced_helpers.len().min(10)],
        );
        if report.referenced_helpers.len() > 10 {
            content.push_str(&format!(
                "  ... and {} more\n",
                report.referenced_helpers.len() - 10
            ));
        }
        self.write_file(SUMMARY, &content)
    }

    /// YAML-shaped dashboard definition presenting the review candidates.
    fn write_review_dashboard(&self, report: &AnalysisReport) -> Result<()> {
        let mut yaml = String::new();
        yaml.push_str("title: Helper Review\n");
        yaml.push_str("views:\n");
        yaml.push_str("  - title: Orphaned Helpers\n");
        yaml.push_str("    path: orphaned-helpers\n");
        yaml.push_str("    cards:\n");
        push_entities_card(
            &mut yaml,
            "Potentially Orphaned (no references)",
            &report.potentially_orphaned,
        );
        push_entities_card(
            &mut yaml,
            "Dashboard-Only (still displayed somewhere)",
            &report.dashboard_only_helpers,
        );
        if !report.error_helpers.is_empty() {
            push_entities_card(&mut yaml, "Analysis Errors", &report.error_helpers);
        }
        self.write_file(REVIEW_DASHBOARD, &yaml)
    }

    fn update_status(
        &self,
        report: &AnalysisReport,
        store: &dyn StateStore,
        outcome: &EmitOutcome,
    ) -> Result<()> {
        let status = EntityId::parse(STATUS_ENTITY_ID).map_err(ReportError::StatusUpdate)?;
        let mut attrs = Attributes::new();
        let totals = &report.analysis;
        attrs.insert("total_helpers".into(), totals.total_helpers.into());
        attrs.insert("referenced_count".into(), totals.referenced_count.into());
        attrs.insert(
            "dashboard_only_count".into(),
            totals.dashboard_only_count.into(),
        );
        attrs.insert("orphaned_count".into(), totals.orphaned_count.into());
        attrs.insert("error_count".into(), totals.error_count.into());
        for (key, path) in [
            ("json_report", &outcome.json_report),
            ("orphaned_file", &outcome.orphaned_list),
            ("dashboard_only_file", &outcome.dashboard_list),
            ("summary_file", &outcome.summary),
        ] {
            if let Some(path) = path {
                attrs.insert(key.into(), path.display().to_string().into());
            }
        }
        store
            .set_state(&status, "complete", attrs)
            .map_err(ReportError::StatusUpdate)
    }

    fn write_file(&self, name: &str, content: &str) -> Result<()> {
        let path = self.results_dir.join(name);
        fs::write(&path, content).map_err(|source| ReportError::WriteFailed { path, source })
    }
}

fn push_section(content: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    content.push_str(title);
    content.push('\n');
    for item in items {
        content.push_str(&format!("  - {item}\n"));
    }
    content.push('\n');
}

fn push_entities_card(yaml: &mut String, title: &str, entities: &[String]) {
    yaml.push_str("      - type: entities\n");
    yaml.push_str(&format!("        title: {title}\n"));
    if entities.is_empty() {
        yaml.push_str("        entities: []\n");
        return;
    }
    yaml.push_str("        entities:\n");
    for entity in entities {
        yaml.push_str(&format!("          - {entity}\n"));
    }
}
