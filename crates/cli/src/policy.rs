//! Optional policy-file overrides for the tuned heuristic tables.
//!
//! The built-in defaults are calibrated against one installation; a JSON
//! policy file lets another installation adjust them without a rebuild.

use anyhow::{Context, Result};
use helper_audit_classify::ClassifierPolicy;
use helper_audit_extract::ExtractorConfig;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PolicyFile {
    pub classifier: Option<ClassifierPolicy>,
    pub extractor: Option<ExtractorConfig>,
    pub scan: ScanOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScanOverrides {
    pub helper_platforms: Option<BTreeSet<String>>,
    pub skip_files: Option<BTreeSet<String>>,
}

pub fn load_policy(path: Option<&Path>) -> Result<PolicyFile> {
    let Some(path) = path else {
        return Ok(PolicyFile::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("cannot read policy file {}", path.display()))?;
    let policy: PolicyFile = serde_json::from_str(&raw)
        .with_context(|| format!("malformed policy file {}", path.display()))?;
    log::info!("Loaded policy overrides from {}", path.display());
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_flag_means_defaults() {
        let policy = load_policy(None).unwrap();
        assert!(policy.classifier.is_none());
        assert!(policy.extractor.is_none());
    }

    #[test]
    fn partial_overrides_parse() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("policy.json");
        fs::write(
            &path,
            r#"{
                "classifier": {"max_residual_attributes": 3},
                "scan": {"helper_platforms": ["template"]}
            }"#,
        )
        .unwrap();

        let policy = load_policy(Some(&path)).unwrap();
        assert_eq!(policy.classifier.unwrap().max_residual_attributes, 3);
        assert_eq!(policy.scan.helper_platforms.unwrap().len(), 1);
        assert!(policy.extractor.is_none());
    }

    #[test]
    fn malformed_policy_is_an_error() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("policy.json");
        fs::write(&path, "{").unwrap();
        assert!(load_policy(Some(&path)).is_err());
    }
}
