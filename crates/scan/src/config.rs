use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Where and how the scanner looks for configuration surfaces.
///
/// Discovery is directory-listing based; the hardcoded filename lists are
/// last-resort fallbacks used only when listing itself fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Root configuration directory.
    pub config_dir: PathBuf,

    /// Persisted-document directory, `.storage` under the config dir.
    pub storage_dir: PathBuf,

    /// Subdirectories of the config dir walked recursively for YAML.
    pub recursive_subdirs: Vec<String>,

    /// Directories checked for dashboard YAML files.
    pub dashboard_subdirs: Vec<String>,

    /// Well-known dashboard files in the config dir root.
    pub dashboard_files: Vec<String>,

    /// Prefix of `.storage` documents holding UI dashboards.
    pub storage_dashboard_prefix: String,

    /// Files never scanned (secrets and other template-free noise).
    pub skip_files: BTreeSet<String>,

    /// Registry platforms that identify UI-created helper entities.
    pub helper_platforms: BTreeSet<String>,

    /// Config-entry domain whose options carry template source text.
    pub template_domain: String,

    /// Last-resort config file list when the root listing fails.
    pub fallback_config_files: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::for_config_dir("/config")
    }
}

impl ScanConfig {
    pub fn for_config_dir(config_dir: impl AsRef<Path>) -> Self {
        let config_dir = config_dir.as_ref().to_path_buf();
        Self {
            storage_dir: config_dir.join(".storage"),
            config_dir,
            recursive_subdirs: vec!["packages".to_string(), "blueprints".to_string()],
            dashboard_subdirs: vec![
                "dashboards".to_string(),
                "lovelace".to_string(),
                "ui".to_string(),
            ],
            dashboard_files: vec!["ui-lovelace.yaml".to_string(), "lovelace.yaml".to_string()],
            storage_dashboard_prefix: "lovelace".to_string(),
            skip_files: ["secrets.yaml", "known_devices.yaml"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            helper_platforms: [
                "template",
                "statistics",
                "integral",
                "derivative",
                "history_stats",
                "trend",
                "threshold",
                "utility_meter",
                "group",
                "combine",
                "times_of_the_day",
                "mold_indicator",
                "schedule",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            template_domain: "template".to_string(),
            fallback_config_files: [
                "configuration.yaml",
                "automations.yaml",
                "scripts.yaml",
                "scenes.yaml",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }

    pub fn entity_registry_path(&self) -> PathBuf {
        self.storage_dir.join("core.entity_registry")
    }

    pub fn config_entries_path(&self) -> PathBuf {
        self.storage_dir.join("core.config_entries")
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.config_dir.as_os_str().is_empty() {
            return Err("config_dir must be set".to_string());
        }
        if self.template_domain.is_empty() {
            return Err("template_domain must be non-empty".to_string());
        }
        if self.helper_platforms.is_empty() {
            return Err("helper_platforms must not be empty".to_string());
        }
        Ok(())
    }
}

pub(crate) fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false)
}
