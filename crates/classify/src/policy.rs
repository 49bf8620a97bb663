use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Curated tables and thresholds for helper classification.
///
/// The defaults mirror what works on a real installation; precision/recall
/// of the heuristics is installation-specific, so every table is
/// serde-overridable rather than baked in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierPolicy {
    /// Domains that are helpers by naming convention alone (Rule 1).
    pub always_helper_domains: BTreeSet<String>,

    /// Domain prefixes treated like `always_helper_domains` (covers the
    /// whole `input_*` family without enumerating it).
    pub always_helper_prefixes: Vec<String>,

    /// Ambiguous domains judged by attribute shape (Rule 2).
    pub template_like_domains: BTreeSet<String>,

    /// Remaining domains that user-created template helpers can occupy
    /// (Rule 3).
    pub other_helper_domains: BTreeSet<String>,

    /// Attribute keys that only integration-owned entities plausibly carry.
    pub integration_indicator_keys: BTreeSet<String>,

    /// Attribute keys a plain UI-created helper is allowed to have.
    pub basic_attribute_keys: BTreeSet<String>,

    /// Rule 2: maximum attribute keys left after removing the basic set.
    pub max_residual_attributes: usize,

    /// Substrings in entity ids that mark known integrations; a deny-list
    /// escape hatch for shapes the attribute heuristic misreads.
    pub integration_name_patterns: Vec<String>,

    /// Platform/integration attribute value that marks a template helper.
    pub template_platform_marker: String,
}

impl Default for ClassifierPolicy {
    fn default() -> Self {
        let set = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>();
        Self {
            always_helper_domains: set(&["counter", "timer", "schedule", "variable"]),
            always_helper_prefixes: vec!["input_".to_string()],
            template_like_domains: set(&["sensor", "binary_sensor"]),
            other_helper_domains: set(&[
                "switch", "light", "cover", "fan", "climate", "lock", "number", "select", "text",
                "button", "time", "date", "datetime",
            ]),
            integration_indicator_keys: set(&[
                "integration_method",
                "flow_sensor_value",
                "detectors_flow",
                "sampling_active_seconds",
                "current_session_start",
                "last_session_end",
                "session_stage",
                "volume_unit",
                "entity_registry_enabled_default",
                "entity_registry_visible_default",
                "platform",
                "supported_features",
                "assumed_state",
                "should_poll",
                "state_class",
                "last_reset",
                "attribution",
                "source_type",
                "restored",
                "unit_of_measurement",
                "device_id",
                "options",
            ]),
            basic_attribute_keys: set(&[
                "friendly_name",
                "device_class",
                "icon",
                "unique_id",
                "entity_category",
            ]),
            max_residual_attributes: 2,
            integration_name_patterns: [
                "motion",
                "person",
                "vehicle",
                "pet",
                "microphone",
                "water_monitor",
                "watt_monitor",
                "backup",
                "mobile_app",
                "fully_kiosk",
                "reolink",
                "sonos",
                "ca_",
                "sm_g998u1",
                "fire_tablet",
                "sun_",
                "day_night_state",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            template_platform_marker: "template".to_string(),
        }
    }
}

impl ClassifierPolicy {
    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.always_helper_domains.is_empty() && self.always_helper_prefixes.is_empty() {
            return Err("at least one always-helper domain or prefix is required".to_string());
        }
        if self.template_platform_marker.is_empty() {
            return Err("template_platform_marker must be non-empty".to_string());
        }
        for prefix in &self.always_helper_prefixes {
            if prefix.is_empty() {
                return Err("always_helper_prefixes entries must be non-empty".to_string());
            }
        }
        Ok(())
    }

    /// Rule 1 domain membership (named domain or prefix family).
    pub fn is_always_helper_domain(&self, domain: &str) -> bool {
        self.always_helper_domains.contains(domain)
            || self
                .always_helper_prefixes
                .iter()
                .any(|prefix| domain.starts_with(prefix.as_str()))
    }

    /// Every domain the classifier could ever call a helper. This is the
    /// extractor's allow-list.
    pub fn helper_capable_domains(&self) -> BTreeSet<String> {
        self.always_helper_domains
            .iter()
            .chain(self.template_like_domains.iter())
            .chain(self.other_helper_domains.iter())
            .cloned()
            .collect()
    }
}
