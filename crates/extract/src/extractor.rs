use helper_audit_classify::ClassifierPolicy;
use helper_audit_model::EntityId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// One layer of the extraction battery.
struct Pattern {
    name: &'static str,
    regex: Regex,
    /// Captures domain and object id separately (`states.domain.object`).
    split_groups: bool,
}

static PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    let compile = |name: &'static str, raw: &str, split_groups: bool| Pattern {
        name,
        regex: Regex::new(raw).expect("extractor pattern must compile"),
        split_groups,
    };
    vec![
        // Templating-function calls whose first string argument is an
        // entity id: states('x.y'), is_state("x.y", ...), state_attr(...).
        compile(
            "template_call",
            r#"(?i)\b(?:states|is_state|state_attr|is_state_attr|has_value|state_translated)\s*\(\s*['"]([a-zA-Z0-9_]+\.[a-zA-Z0-9_]+)['"]"#,
            false,
        ),
        // Direct state-object access: states.sensor.kitchen_temp.state
        compile(
            "state_object_access",
            r"(?i)\bstates\.([a-zA-Z0-9_]+)\.([a-zA-Z0-9_]+)",
            true,
        ),
        // YAML-structural keys: entity:, entity_id:, sensor:, input_boolean:
        compile(
            "yaml_entity_key",
            r#"(?im)\b(?:entity|entity_id|sensor|binary_sensor|input_[a-z_]+)\s*:\s*['"]?([a-zA-Z0-9_]+\.[a-zA-Z0-9_]+)"#,
            false,
        ),
        // YAML list items: `- sensor.example` / `- entity: sensor.example`
        compile(
            "yaml_list_item",
            r#"(?im)^\s*-\s*(?:entity:\s*)?['"]?([a-zA-Z0-9_]+\.[a-zA-Z0-9_]+)['"]?\s*$"#,
            false,
        ),
        // Bare dotted identifiers, quoted or not. The allow-list filter is
        // what keeps this broad layer from matching version numbers and
        // file names.
        compile(
            "bare_dotted_id",
            r"(?i)\b([a-zA-Z0-9_]+\.[a-zA-Z0-9_]+)\b",
            false,
        ),
    ]
});

/// Domain allow-list the extractor filters every match through.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Domains whose entities may be helpers.
    pub allowed_domains: BTreeSet<String>,

    /// Domain prefixes treated as allowed (the `input_*` family).
    pub allowed_domain_prefixes: Vec<String>,
}

impl ExtractorConfig {
    /// Allow-list derived from a classifier policy: the union of every
    /// domain Rules 1-3 could classify as a helper.
    pub fn from_policy(policy: &ClassifierPolicy) -> Self {
        Self {
            allowed_domains: policy.helper_capable_domains(),
            allowed_domain_prefixes: policy.always_helper_prefixes.clone(),
        }
    }

    pub fn is_allowed_domain(&self, domain: &str) -> bool {
        self.allowed_domains.contains(domain)
            || self
                .allowed_domain_prefixes
                .iter()
                .any(|prefix| domain.starts_with(prefix.as_str()))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self::from_policy(&ClassifierPolicy::default())
    }
}

/// Extracts helper-domain entity references from arbitrary text.
pub struct ReferenceExtractor {
    config: ExtractorConfig,
}

impl ReferenceExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// All allow-listed entity ids mentioned in `text`. Deduplicated and
    /// unordered; repeated input yields the identical set.
    pub fn extract_references(&self, text: &str) -> BTreeSet<EntityId> {
        let mut references = BTreeSet::new();
        if text.is_empty() {
            return references;
        }

        // Track raw candidates per pattern only for diagnostics; the result
        // set does not depend on pattern order.
        for pattern in PATTERNS.iter() {
            let mut matched: HashSet<String> = HashSet::new();
            for captures in pattern.regex.captures_iter(text) {
                let raw = if pattern.split_groups {
                    let (Some(domain), Some(object)) = (captures.get(1), captures.get(2)) else {
                        continue;
                    };
                    format!("{}.{}", domain.as_str(), object.as_str())
                } else {
                    let Some(group) = captures.get(1) else {
                        continue;
                    };
                    group.as_str().to_string()
                };
                // Matching is case-insensitive; entity ids are normalized
                // to their canonical lowercase form.
                matched.insert(raw.to_ascii_lowercase());
            }
            if !matched.is_empty() {
                log::debug!("pattern '{}' matched {} candidates", pattern.name, matched.len());
            }
            for raw in matched {
                let Ok(entity) = EntityId::parse(&raw) else {
                    continue;
                };
                if self.config.is_allowed_domain(entity.domain()) {
                    references.insert(entity);
                }
            }
        }

        references
    }
}
