//! Readers for the host's persisted `.storage` documents. Both schemas are
//! fixed external contracts; a missing or malformed document degrades to an
//! empty result rather than failing the run.

use crate::error::ScanError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    data: RegistryData,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryData {
    #[serde(default)]
    entities: Vec<RegistryEntry>,
}

/// One entity-registry record; provides the platform and config-entry
/// metadata the live snapshot lacks.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryEntry {
    pub entity_id: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub config_entry_id: Option<String>,
    #[serde(default)]
    pub unique_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ConfigEntriesDocument {
    #[serde(default)]
    data: ConfigEntriesData,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigEntriesData {
    #[serde(default)]
    entries: Vec<ConfigEntry>,
}

/// One integration instance from the config-entries document.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigEntry {
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub options: serde_json::Value,
}

/// Template source text recovered from a UI-created template entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSource {
    pub title: String,
    pub text: String,
}

pub(crate) fn load_registry_entries(path: &Path) -> Vec<RegistryEntry> {
    match read_json::<RegistryDocument>(path) {
        Ok(doc) => {
            log::info!(
                "Entity registry contains {} entities",
                doc.data.entities.len()
            );
            doc.data.entities
        }
        Err(err) => {
            log::warn!("{err}; continuing without registry metadata");
            Vec::new()
        }
    }
}

pub(crate) fn load_config_entries(path: &Path) -> Vec<ConfigEntry> {
    match read_json::<ConfigEntriesDocument>(path) {
        Ok(doc) => doc.data.entries,
        Err(err) => {
            log::warn!("{err}; continuing without config entries");
            Vec::new()
        }
    }
}

/// Pull the template source text out of template-domain entries. The UI
/// stores the state template under `options.state`.
pub(crate) fn template_sources(entries: &[ConfigEntry], template_domain: &str) -> Vec<TemplateSource> {
    entries
        .iter()
        .filter(|entry| entry.domain == template_domain)
        .filter_map(|entry| {
            let text = entry.options.get("state")?.as_str()?;
            if text.is_empty() {
                return None;
            }
            Some(TemplateSource {
                title: entry.title.clone(),
                text: text.to_string(),
            })
        })
        .collect()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ScanError> {
    let raw = fs::read_to_string(path).map_err(|source| ScanError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ScanError::MalformedDocument {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn parses_registry_document() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("core.entity_registry");
        std::fs::write(
            &path,
            r#"{"version": 1, "data": {"entities": [
                {"entity_id": "sensor.water_flow", "platform": "template",
                 "config_entry_id": null, "unique_id": "abc", "name": null,
                 "original_name": "Water Flow"},
                {"entity_id": "input_boolean.guests", "platform": "input_boolean"}
            ]}}"#,
        )
        .unwrap();

        let entries = load_registry_entries(&path);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].platform.as_deref(), Some("template"));
        assert_eq!(entries[0].original_name.as_deref(), Some("Water Flow"));
        assert_eq!(entries[1].config_entry_id, None);
    }

    #[test]
    fn truncated_registry_degrades_to_empty() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("core.entity_registry");
        std::fs::write(&path, r#"{"data": {"entities": [{"entity_id""#).unwrap();
        assert!(load_registry_entries(&path).is_empty());
        // Missing file degrades the same way.
        assert!(load_registry_entries(&temp.path().join("missing")).is_empty());
    }

    #[test]
    fn extracts_template_sources_from_config_entries() {
        let entries = vec![
            ConfigEntry {
                domain: "template".into(),
                title: "Water Flow Average".into(),
                options: serde_json::json!({"state": "{{ states('sensor.water_flow_helper') }}"}),
            },
            ConfigEntry {
                domain: "template".into(),
                title: "No State".into(),
                options: serde_json::json!({"name": "x"}),
            },
            ConfigEntry {
                domain: "mqtt".into(),
                title: "Broker".into(),
                options: serde_json::json!({"state": "ignored"}),
            },
        ];

        let sources = template_sources(&entries, "template");
        assert_eq!(
            sources,
            vec![TemplateSource {
                title: "Water Flow Average".into(),
                text: "{{ states('sensor.water_flow_helper') }}".into(),
            }]
        );
    }
}
