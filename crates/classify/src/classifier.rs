use crate::policy::ClassifierPolicy;
use helper_audit_model::{Attributes, HelperCandidate};

/// Classifier verdict for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Helper,
    NotHelper,
}

impl Classification {
    pub const fn is_helper(self) -> bool {
        matches!(self, Classification::Helper)
    }
}

/// Pure, side-effect-free helper classifier. For a fixed candidate the
/// verdict is always the same; a failed attribute lookup classifies
/// NotHelper rather than erroring.
pub struct EntityClassifier {
    policy: ClassifierPolicy,
}

impl EntityClassifier {
    pub fn new(policy: ClassifierPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ClassifierPolicy {
        &self.policy
    }

    pub fn classify(&self, candidate: &HelperCandidate) -> Classification {
        let domain = candidate.entity_id.domain();

        // Rule 1: naming convention, authoritative. Integrations sometimes
        // instantiate entities whose ids collide with helper-domain naming,
        // which is what the config-entry marker catches.
        if self.policy.is_always_helper_domain(domain) {
            if has_config_entry(candidate) {
                log::debug!(
                    "{} has a config entry, not a hand-created helper",
                    candidate.entity_id
                );
                return Classification::NotHelper;
            }
            return Classification::Helper;
        }

        if self.policy.template_like_domains.contains(domain) {
            return self.classify_template_like(candidate);
        }

        if self.policy.other_helper_domains.contains(domain) {
            return self.classify_other_domain(candidate);
        }

        Classification::NotHelper
    }

    /// Rule 2: sensor-like domains that could be platform-owned or
    /// user-created template helpers.
    fn classify_template_like(&self, candidate: &HelperCandidate) -> Classification {
        // Independent acceptance path: explicitly declared template platform.
        if self.declares_template_platform(candidate) {
            log::debug!("{} declares a template platform", candidate.entity_id);
            return Classification::Helper;
        }

        let Some(attrs) = candidate.attributes.as_ref() else {
            // Fail closed: an error is never a helper.
            return Classification::NotHelper;
        };

        if let Some(key) = self.first_integration_indicator(attrs) {
            log::debug!(
                "{} carries integration indicator '{key}'",
                candidate.entity_id
            );
            return Classification::NotHelper;
        }

        let residual = attrs
            .keys()
            .filter(|key| !self.policy.basic_attribute_keys.contains(key.as_str()))
            .count();
        if residual > self.policy.max_residual_attributes {
            return Classification::NotHelper;
        }

        if let Some(pattern) = self.matching_deny_pattern(candidate) {
            log::debug!(
                "{} matches known-integration pattern '{pattern}'",
                candidate.entity_id
            );
            return Classification::NotHelper;
        }

        log::debug!(
            "Detected template helper by attribute shape: {}",
            candidate.entity_id
        );
        Classification::Helper
    }

    /// Rule 3: switches, lights, covers and the rest only qualify when
    /// their attribute set is non-empty, carries no integration marker,
    /// and stays within the small basic set.
    fn classify_other_domain(&self, candidate: &HelperCandidate) -> Classification {
        if self.declares_template_platform(candidate) {
            return Classification::Helper;
        }

        let Some(attrs) = candidate.attributes.as_ref() else {
            return Classification::NotHelper;
        };
        if attrs.is_empty() {
            return Classification::NotHelper;
        }
        if self.first_integration_indicator(attrs).is_some() {
            return Classification::NotHelper;
        }
        let within_basic = attrs
            .keys()
            .all(|key| self.policy.basic_attribute_keys.contains(key.as_str()));
        if within_basic {
            Classification::Helper
        } else {
            Classification::NotHelper
        }
    }

    fn declares_template_platform(&self, candidate: &HelperCandidate) -> bool {
        let marker = self.policy.template_platform_marker.as_str();
        if candidate.platform.as_deref() == Some(marker) {
            return true;
        }
        let Some(attrs) = candidate.attributes.as_ref() else {
            return false;
        };
        ["platform", "integration"].iter().any(|key| {
            attrs
                .get(*key)
                .and_then(|value| value.as_str())
                .is_some_and(|value| value.contains(marker))
        })
    }

    fn first_integration_indicator<'a>(&'a self, attrs: &'a Attributes) -> Option<&'a str> {
        self.policy
            .integration_indicator_keys
            .iter()
            .map(String::as_str)
            .find(|key| attrs.contains_key(*key))
    }

    fn matching_deny_pattern(&self, candidate: &HelperCandidate) -> Option<&str> {
        let id = candidate.entity_id.as_str();
        self.policy
            .integration_name_patterns
            .iter()
            .map(String::as_str)
            .find(|pattern| id.contains(pattern))
    }
}

fn has_config_entry(candidate: &HelperCandidate) -> bool {
    candidate
        .config_entry_id
        .as_deref()
        .is_some_and(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use helper_audit_model::{Attributes, EntityId};
    use pretty_assertions::assert_eq;

    fn classifier() -> EntityClassifier {
        EntityClassifier::new(ClassifierPolicy::default())
    }

    fn candidate(raw: &str) -> HelperCandidate {
        HelperCandidate::new(EntityId::parse(raw).unwrap())
    }

    fn attrs(keys: &[&str]) -> Attributes {
        keys.iter()
            .map(|key| (key.to_string(), serde_json::Value::Null))
            .collect()
    }

    #[test]
    fn always_helper_domains_classify_unconditionally() {
        let c = classifier();
        for raw in [
            "input_boolean.vacation_mode",
            "input_number.target_temp",
            "counter.coffee",
            "timer.laundry",
            "variable.last_run",
        ] {
            assert_eq!(
                c.classify(&candidate(raw)),
                Classification::Helper,
                "{raw}"
            );
        }
    }

    #[test]
    fn config_entry_marker_overrides_naming_convention() {
        let c = classifier();
        let with_entry = candidate("input_boolean.integration_owned").with_config_entry("abc123");
        assert_eq!(c.classify(&with_entry), Classification::NotHelper);

        // Same entity without the marker is a helper again.
        let without = candidate("input_boolean.integration_owned");
        assert_eq!(c.classify(&without), Classification::Helper);

        // Empty marker does not count.
        let empty = candidate("input_boolean.integration_owned").with_config_entry("");
        assert_eq!(c.classify(&empty), Classification::Helper);
    }

    #[test]
    fn template_shaped_sensor_is_helper() {
        let c = classifier();
        let cand = candidate("sensor.water_flow_helper")
            .with_attributes(attrs(&["friendly_name", "device_class", "icon"]));
        assert_eq!(c.classify(&cand), Classification::Helper);
    }

    #[test]
    fn integration_indicator_rejects_sensor() {
        let c = classifier();
        let cand = candidate("sensor.upstairs_temp")
            .with_attributes(attrs(&["friendly_name", "state_class", "icon"]));
        assert_eq!(c.classify(&cand), Classification::NotHelper);
    }

    #[test]
    fn residual_attribute_budget_applies() {
        let c = classifier();
        // Two extra keys are within budget.
        let ok = candidate("sensor.two_extras").with_attributes(attrs(&[
            "friendly_name",
            "icon",
            "extra_one",
            "extra_two",
        ]));
        assert_eq!(c.classify(&ok), Classification::Helper);

        // Three extra keys are not.
        let over = candidate("sensor.three_extras").with_attributes(attrs(&[
            "friendly_name",
            "extra_one",
            "extra_two",
            "extra_three",
        ]));
        assert_eq!(c.classify(&over), Classification::NotHelper);
    }

    #[test]
    fn deny_list_pattern_rejects_sensor() {
        let c = classifier();
        let cand = candidate("binary_sensor.driveway_motion")
            .with_attributes(attrs(&["friendly_name", "device_class"]));
        assert_eq!(c.classify(&cand), Classification::NotHelper);
    }

    #[test]
    fn declared_template_platform_accepts_independently() {
        let c = classifier();
        // Registry-declared platform wins even with integration-looking attrs.
        let cand = candidate("sensor.reolink_adjacent")
            .with_attributes(attrs(&["friendly_name", "state_class"]))
            .with_platform("template");
        assert_eq!(c.classify(&cand), Classification::Helper);
    }

    #[test]
    fn other_domains_need_small_basic_attribute_set() {
        let c = classifier();
        let helper = candidate("switch.fake_rain")
            .with_attributes(attrs(&["friendly_name", "icon"]));
        assert_eq!(c.classify(&helper), Classification::Helper);

        let empty = candidate("switch.fake_rain").with_attributes(Attributes::new());
        assert_eq!(c.classify(&empty), Classification::NotHelper);

        let oversized = candidate("switch.real_device")
            .with_attributes(attrs(&["friendly_name", "icon", "current_power_w"]));
        assert_eq!(c.classify(&oversized), Classification::NotHelper);
    }

    #[test]
    fn failed_attribute_lookup_is_never_a_helper() {
        let c = classifier();
        // `attributes: None` models a failed lookup.
        assert_eq!(
            c.classify(&candidate("sensor.vanished")),
            Classification::NotHelper
        );
        assert_eq!(
            c.classify(&candidate("switch.vanished")),
            Classification::NotHelper
        );
    }

    #[test]
    fn unknown_domains_are_not_helpers() {
        let c = classifier();
        let cand = candidate("media_player.kitchen")
            .with_attributes(attrs(&["friendly_name", "icon"]));
        assert_eq!(c.classify(&cand), Classification::NotHelper);
    }

    #[test]
    fn classification_is_deterministic() {
        let c = classifier();
        let cand = candidate("sensor.water_flow_helper")
            .with_attributes(attrs(&["friendly_name", "device_class", "icon"]));
        let first = c.classify(&cand);
        for _ in 0..10 {
            assert_eq!(c.classify(&cand), first);
        }
    }
}
