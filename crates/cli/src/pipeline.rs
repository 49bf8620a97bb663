//! End-to-end analysis pipeline: scan -> reconcile -> report. Runs
//! synchronously; the CLI moves it off the async scheduler with
//! `spawn_blocking`.

use crate::policy::PolicyFile;
use anyhow::Result;
use helper_audit_classify::EntityClassifier;
use helper_audit_extract::{ExtractorConfig, ReferenceExtractor};
use helper_audit_model::StateStore;
use helper_audit_reconcile::reconcile;
use helper_audit_report::{AnalysisReport, EmitOutcome, ReportEmitter};
use helper_audit_scan::{ScanConfig, SourceScanner};
use std::path::PathBuf;

pub struct AnalyzeOptions {
    pub config_dir: PathBuf,
    pub results_dir: PathBuf,
    pub policy: PolicyFile,
}

pub struct RunOutput {
    pub report: AnalysisReport,
    pub emitted: EmitOutcome,
}

pub fn run_analysis(options: &AnalyzeOptions, store: &dyn StateStore) -> Result<RunOutput> {
    let classifier_policy = options.policy.classifier.clone().unwrap_or_default();
    classifier_policy.validate().map_err(anyhow::Error::msg)?;

    // The extractor allow-list tracks the classifier policy unless the
    // policy file pins it explicitly.
    let extractor_config = options
        .policy
        .extractor
        .clone()
        .unwrap_or_else(|| ExtractorConfig::from_policy(&classifier_policy));

    let mut scan_config = ScanConfig::for_config_dir(&options.config_dir);
    if let Some(platforms) = options.policy.scan.helper_platforms.clone() {
        scan_config.helper_platforms = platforms;
    }
    if let Some(skip_files) = options.policy.scan.skip_files.clone() {
        scan_config.skip_files = skip_files;
    }
    scan_config.validate().map_err(anyhow::Error::msg)?;

    log::info!(
        "Starting helper analysis for {}",
        options.config_dir.display()
    );
    let scanner = SourceScanner::new(
        scan_config,
        EntityClassifier::new(classifier_policy),
        ReferenceExtractor::new(extractor_config),
    );
    let outcome = scanner.scan(store);

    let (classified, summary) = reconcile(&outcome.helpers, &outcome.graph);
    let report = AnalysisReport::build(&classified, summary, store, &outcome.config_files);

    let emitter = ReportEmitter::new(&options.results_dir);
    let emitted = emitter.emit(&report, store);

    log::info!(
        "Helper analysis complete: {} helpers, {} orphaned",
        report.analysis.total_helpers,
        report.analysis.orphaned_count
    );
    Ok(RunOutput { report, emitted })
}
