use crate::config::ScanConfig;
use crate::discover::{discover_config_files, discover_dashboard_files};
use crate::storage::{
    load_config_entries, load_registry_entries, template_sources, RegistryEntry,
};
use helper_audit_classify::EntityClassifier;
use helper_audit_extract::ReferenceExtractor;
use helper_audit_model::{
    EntityId, HelperCandidate, RefGraph, ReferenceSource, StateStore,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Everything one scan pass produces: the helper universe and the
/// provenance graph of reference edges.
#[derive(Debug)]
pub struct ScanOutcome {
    pub helpers: Vec<HelperCandidate>,
    pub graph: RefGraph,
    pub config_files: Vec<PathBuf>,
    pub dashboard_files: Vec<PathBuf>,
    pub template_entry_count: usize,
}

/// Walks every known configuration surface and feeds each one's text to
/// the extractor, while assembling the helper universe from the live
/// snapshot, the entity registry, and the classifier heuristics.
pub struct SourceScanner {
    config: ScanConfig,
    classifier: EntityClassifier,
    extractor: ReferenceExtractor,
}

impl SourceScanner {
    pub fn new(
        config: ScanConfig,
        classifier: EntityClassifier,
        extractor: ReferenceExtractor,
    ) -> Self {
        Self {
            config,
            classifier,
            extractor,
        }
    }

    pub fn scan(&self, store: &dyn StateStore) -> ScanOutcome {
        let live_ids = store.entity_ids();
        log_domain_census(&live_ids);

        let registry: BTreeMap<String, RegistryEntry> =
            load_registry_entries(&self.config.entity_registry_path())
                .into_iter()
                .map(|entry| (entry.entity_id.clone(), entry))
                .collect();
        let config_entries = load_config_entries(&self.config.config_entries_path());

        let helpers = self.collect_helpers(store, &live_ids, &registry);
        log::info!("Helper universe contains {} entities", helpers.len());

        let mut graph = RefGraph::new();

        let config_files = discover_config_files(&self.config);
        for path in &config_files {
            self.scan_file(&mut graph, path, ReferenceSource::config_file(file_label(path)));
        }

        let dashboard_files = discover_dashboard_files(&self.config);
        for path in &dashboard_files {
            self.scan_file(&mut graph, path, ReferenceSource::dashboard(file_label(path)));
        }

        // UI-authored templates live in config entries, not files.
        let templates = template_sources(&config_entries, &self.config.template_domain);
        let template_entry_count = templates.len();
        for template in &templates {
            let refs = self.extractor.extract_references(&template.text);
            if !refs.is_empty() {
                log::debug!(
                    "UI template '{}' references {} helper entities",
                    template.title,
                    refs.len()
                );
            }
            graph.add_source_refs(&ReferenceSource::template(template.title.as_str()), refs);
        }

        // Remaining integration entries can pin helpers through arbitrary
        // option structures; scan their serialized options as raw text.
        for entry in &config_entries {
            if entry.domain == self.config.template_domain || entry.options.is_null() {
                continue;
            }
            let text = entry.options.to_string();
            let refs = self.extractor.extract_references(&text);
            if !refs.is_empty() {
                graph.add_source_refs(&ReferenceSource::integration_entry(entry.title.as_str()), refs);
            }
        }

        log::info!(
            "Scan complete: {} sources, {} reference edges",
            graph.source_count(),
            graph.edge_count()
        );

        ScanOutcome {
            helpers,
            graph,
            config_files,
            dashboard_files,
            template_entry_count,
        }
    }

    /// Helper universe: live snapshot ids, enriched with registry metadata,
    /// filtered through the classifier plus the registry helper-platform
    /// table.
    fn collect_helpers(
        &self,
        store: &dyn StateStore,
        live_ids: &[EntityId],
        registry: &BTreeMap<String, RegistryEntry>,
    ) -> Vec<HelperCandidate> {
        let mut helpers = Vec::new();
        for entity_id in live_ids {
            let mut candidate = HelperCandidate::new(entity_id.clone());
            match store.attributes(entity_id) {
                Ok(attrs) => candidate.attributes = Some(attrs),
                Err(err) => {
                    log::warn!("Error checking entity {entity_id}: {err}");
                }
            }
            if let Some(entry) = registry.get(entity_id.as_str()) {
                candidate.platform = entry.platform.clone();
                candidate.config_entry_id = entry.config_entry_id.clone();
            }

            let registry_helper_platform = candidate
                .platform
                .as_deref()
                .is_some_and(|platform| self.config.helper_platforms.contains(platform));
            if registry_helper_platform {
                log::debug!(
                    "Helper found via registry platform: {entity_id} ({})",
                    candidate.platform.as_deref().unwrap_or_default()
                );
                helpers.push(candidate);
            } else if self.classifier.classify(&candidate).is_helper() {
                helpers.push(candidate);
            }
        }
        helpers
    }

    fn scan_file(&self, graph: &mut RefGraph, path: &Path, source: ReferenceSource) {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!("Error reading {}: {err}; skipping", path.display());
                return;
            }
        };
        let refs = self.extractor.extract_references(&text);
        if !refs.is_empty() {
            log::debug!(
                "{} references {} helper entities",
                path.display(),
                refs.len()
            );
        }
        graph.add_source_refs(&source, refs);
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn log_domain_census(live_ids: &[EntityId]) {
    if !log::log_enabled!(log::Level::Debug) {
        return;
    }
    let mut census: BTreeMap<&str, usize> = BTreeMap::new();
    for id in live_ids {
        *census.entry(id.domain()).or_default() += 1;
    }
    for (domain, count) in census {
        log::debug!("domain census: {domain}: {count}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helper_audit_classify::ClassifierPolicy;
    use helper_audit_extract::ExtractorConfig;
    use helper_audit_model::{Attributes, MemoryStateStore, SourceKind};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn id(raw: &str) -> EntityId {
        EntityId::parse(raw).unwrap()
    }

    fn scanner_for(dir: &Path) -> SourceScanner {
        let policy = ClassifierPolicy::default();
        let extractor = ReferenceExtractor::new(ExtractorConfig::from_policy(&policy));
        SourceScanner::new(
            ScanConfig::for_config_dir(dir),
            EntityClassifier::new(policy),
            extractor,
        )
    }

    fn basic_attrs() -> Attributes {
        let mut attrs = Attributes::new();
        attrs.insert("friendly_name".into(), "Helper".into());
        attrs
    }

    #[test]
    fn scans_files_templates_and_dashboards_into_edges() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("automations.yaml"),
            "condition: \"{{ states('input_boolean.vacation_mode') == 'on' }}\"\n",
        )
        .unwrap();
        let dashboards = temp.path().join("dashboards");
        fs::create_dir_all(&dashboards).unwrap();
        fs::write(
            dashboards.join("main.yaml"),
            "cards:\n  - entity: sensor.water_flow_helper\n",
        )
        .unwrap();
        let storage = temp.path().join(".storage");
        fs::create_dir_all(&storage).unwrap();
        fs::write(
            storage.join("core.config_entries"),
            r#"{"data": {"entries": [
                {"domain": "template", "title": "Flow Average",
                 "options": {"state": "{{ states('sensor.raw_flow') }}"}},
                {"domain": "utility_meter", "title": "Water Meter",
                 "options": {"source": "counter.water_pulses"}}
            ]}}"#,
        )
        .unwrap();

        let store = MemoryStateStore::new();
        store.insert(id("input_boolean.vacation_mode"), "off", basic_attrs());
        let outcome = scanner_for(temp.path()).scan(&store);

        let vacation_sources = outcome.graph.sources_for(&id("input_boolean.vacation_mode"));
        assert_eq!(vacation_sources.len(), 1);
        assert!(vacation_sources
            .iter()
            .all(|s| s.kind == SourceKind::ConfigFile && s.label == "automations.yaml"));

        let dashboard_sources = outcome.graph.sources_for(&id("sensor.water_flow_helper"));
        assert!(dashboard_sources
            .iter()
            .any(|s| s.kind == SourceKind::Dashboard && s.label == "main.yaml"));

        let template_sources = outcome.graph.sources_for(&id("sensor.raw_flow"));
        assert!(template_sources
            .iter()
            .any(|s| s.kind == SourceKind::Template && s.label == "Flow Average"));
        assert_eq!(outcome.template_entry_count, 1);

        let meter_sources = outcome.graph.sources_for(&id("counter.water_pulses"));
        assert!(meter_sources
            .iter()
            .any(|s| s.kind == SourceKind::IntegrationEntry && s.label == "Water Meter"));
    }

    #[test]
    fn root_dashboard_reference_yields_only_a_dashboard_edge() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("ui-lovelace.yaml"),
            "views:\n  - cards:\n      - entity: sensor.water_flow_helper\n",
        )
        .unwrap();

        let store = MemoryStateStore::new();
        store.insert(id("sensor.water_flow_helper"), "1.2", basic_attrs());
        let outcome = scanner_for(temp.path()).scan(&store);

        // A root-level dashboard file must not double as a config file;
        // otherwise its references would count as automation usage.
        let sources = outcome.graph.sources_for(&id("sensor.water_flow_helper"));
        let kinds: Vec<SourceKind> = sources.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, vec![SourceKind::Dashboard]);
        assert!(!outcome
            .config_files
            .iter()
            .any(|p| p.ends_with("ui-lovelace.yaml")));
    }

    #[test]
    fn universe_combines_rule1_registry_and_heuristic_helpers() {
        let temp = tempdir().unwrap();
        let storage = temp.path().join(".storage");
        fs::create_dir_all(&storage).unwrap();
        fs::write(
            storage.join("core.entity_registry"),
            r#"{"data": {"entities": [
                {"entity_id": "sensor.flow_average", "platform": "statistics"},
                {"entity_id": "input_boolean.from_integration",
                 "platform": "some_integration", "config_entry_id": "abc123"}
            ]}}"#,
        )
        .unwrap();

        let store = MemoryStateStore::new();
        store.insert(id("timer.laundry"), "idle", basic_attrs());
        store.insert(id("sensor.flow_average"), "3.2", Attributes::new());
        store.insert(id("sensor.water_flow_helper"), "1.0", basic_attrs());
        store.insert(id("input_boolean.from_integration"), "on", basic_attrs());
        let mut integration_attrs = basic_attrs();
        integration_attrs.insert("state_class".into(), "measurement".into());
        store.insert(id("sensor.grid_power"), "230", integration_attrs);

        let outcome = scanner_for(temp.path()).scan(&store);
        let mut universe: Vec<&str> = outcome
            .helpers
            .iter()
            .map(|h| h.entity_id.as_str())
            .collect();
        universe.sort();

        // timer via Rule 1, flow_average via registry platform, water_flow
        // via the attribute heuristic; the config-entry marker and the
        // state_class indicator exclude the other two.
        assert_eq!(
            universe,
            vec![
                "sensor.flow_average",
                "sensor.water_flow_helper",
                "timer.laundry"
            ]
        );
    }

    #[test]
    fn attribute_lookup_failure_keeps_rule1_helper_with_no_attributes() {
        let temp = tempdir().unwrap();
        let store = MemoryStateStore::new();
        store.insert(id("timer.laundry"), "idle", basic_attrs());
        store.fail_attributes(id("timer.laundry"));

        let outcome = scanner_for(temp.path()).scan(&store);
        assert_eq!(outcome.helpers.len(), 1);
        assert!(outcome.helpers[0].attributes.is_none());
    }

    #[test]
    fn run_is_idempotent_for_unchanged_inputs() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("scripts.yaml"),
            "entity_id: input_number.target\n",
        )
        .unwrap();
        let store = MemoryStateStore::new();
        store.insert(id("input_number.target"), "5", basic_attrs());

        let scanner = scanner_for(temp.path());
        let first = scanner.scan(&store);
        let second = scanner.scan(&store);
        assert_eq!(first.graph.edge_count(), second.graph.edge_count());
        assert_eq!(
            first.graph.sources_for(&id("input_number.target")),
            second.graph.sources_for(&id("input_number.target"))
        );
        assert_eq!(first.helpers.len(), second.helpers.len());
    }
}
