//! Adaptive discovery of file-based sources: list directories and filter by
//! extension and naming convention instead of trusting a fixed file list.

use crate::config::{is_yaml_file, ScanConfig};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration files: YAML in the config dir root (non-recursive), plus
/// full walks of the packages/blueprints subtrees. Falls back to the
/// well-known filename list only when the root listing itself fails.
pub(crate) fn discover_config_files(config: &ScanConfig) -> Vec<PathBuf> {
    let mut files = BTreeSet::new();

    match fs::read_dir(&config.config_dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_file()
                    && is_yaml_file(&path)
                    && !is_skipped(config, &path)
                    && !is_root_dashboard(config, &path)
                {
                    files.insert(path);
                }
            }
        }
        Err(err) => {
            log::warn!(
                "Cannot list {}: {err}; using fallback config file list",
                config.config_dir.display()
            );
            for name in &config.fallback_config_files {
                let path = config.config_dir.join(name);
                if path.is_file() {
                    files.insert(path);
                }
            }
        }
    }

    for subdir in &config.recursive_subdirs {
        let root = config.config_dir.join(subdir);
        if !root.is_dir() {
            continue;
        }
        for entry in WalkDir::new(&root).into_iter() {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file()
                        && is_yaml_file(path)
                        && !is_skipped(config, path)
                    {
                        files.insert(path.to_path_buf());
                    }
                }
                Err(err) => log::warn!("Failed to read entry under {}: {err}", root.display()),
            }
        }
    }

    log::info!("Discovered {} configuration files", files.len());
    files.into_iter().collect()
}

/// Dashboard definitions: well-known root files, YAML in dashboard
/// directories, and UI dashboards persisted under `.storage`.
pub(crate) fn discover_dashboard_files(config: &ScanConfig) -> Vec<PathBuf> {
    let mut files = BTreeSet::new();

    for name in &config.dashboard_files {
        let path = config.config_dir.join(name);
        if path.is_file() {
            files.insert(path);
        }
    }

    for subdir in &config.dashboard_subdirs {
        let dir = config.config_dir.join(subdir);
        match fs::read_dir(&dir) {
            Ok(entries) => {
                for entry in entries.flatten() {
                    let path = entry.path();
                    if path.is_file() && is_yaml_file(&path) {
                        files.insert(path);
                    }
                }
            }
            Err(err) => log::debug!("Could not list directory {}: {err}", dir.display()),
        }
    }

    // UI dashboards do not always materialize YAML files; the persisted
    // `.storage/lovelace*` documents are scanned as raw text.
    match fs::read_dir(&config.storage_dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let path = entry.path();
                let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                if path.is_file() && name.starts_with(config.storage_dashboard_prefix.as_str()) {
                    files.insert(path);
                }
            }
        }
        Err(err) => log::debug!(
            "Could not list storage directory {}: {err}",
            config.storage_dir.display()
        ),
    }

    log::info!("Discovered {} dashboard files", files.len());
    files.into_iter().collect()
}

fn is_skipped(config: &ScanConfig, path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| config.skip_files.contains(name))
        .unwrap_or(false)
}

/// Root-level dashboard definitions are claimed by dashboard discovery;
/// ingesting them as config files would turn their references into
/// automation edges and defeat the dashboard-only downgrade.
fn is_root_dashboard(config: &ScanConfig, path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| config.dashboard_files.iter().any(|f| f == name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn names(paths: &[PathBuf]) -> Vec<String> {
        let mut names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn config_discovery_lists_root_and_recursive_subdirs() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("configuration.yaml"), "sensor:").unwrap();
        fs::write(temp.path().join("secrets.yaml"), "token: x").unwrap();
        fs::write(temp.path().join("notes.txt"), "not yaml").unwrap();
        let nested = temp.path().join("packages").join("water");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("monitor.yaml"), "template:").unwrap();
        // Root listing is non-recursive outside the named subdirs.
        let other = temp.path().join("www");
        fs::create_dir_all(&other).unwrap();
        fs::write(other.join("card.yaml"), "type: custom").unwrap();

        let files = discover_config_files(&ScanConfig::for_config_dir(temp.path()));
        assert_eq!(names(&files), vec!["configuration.yaml", "monitor.yaml"]);
    }

    #[test]
    fn root_dashboard_files_are_dashboards_not_config_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("configuration.yaml"), "sensor:").unwrap();
        fs::write(temp.path().join("ui-lovelace.yaml"), "views:").unwrap();
        fs::write(temp.path().join("lovelace.yaml"), "views:").unwrap();

        let config = ScanConfig::for_config_dir(temp.path());
        assert_eq!(names(&discover_config_files(&config)), vec!["configuration.yaml"]);
        assert_eq!(
            names(&discover_dashboard_files(&config)),
            vec!["lovelace.yaml", "ui-lovelace.yaml"]
        );
    }

    #[test]
    fn dashboard_discovery_covers_dirs_and_storage() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("ui-lovelace.yaml"), "views:").unwrap();
        let dashboards = temp.path().join("dashboards");
        fs::create_dir_all(&dashboards).unwrap();
        fs::write(dashboards.join("energy.yaml"), "views:").unwrap();
        fs::write(dashboards.join("readme.md"), "docs").unwrap();
        let storage = temp.path().join(".storage");
        fs::create_dir_all(&storage).unwrap();
        fs::write(storage.join("lovelace.main"), "{}").unwrap();
        fs::write(storage.join("core.entity_registry"), "{}").unwrap();

        let files = discover_dashboard_files(&ScanConfig::for_config_dir(temp.path()));
        assert_eq!(
            names(&files),
            vec!["energy.yaml", "lovelace.main", "ui-lovelace.yaml"]
        );
    }

    #[test]
    fn missing_directories_discover_nothing() {
        let temp = tempdir().unwrap();
        let config = ScanConfig::for_config_dir(temp.path().join("gone"));
        // Root listing fails, fallback names do not exist either.
        assert!(discover_config_files(&config).is_empty());
        assert!(discover_dashboard_files(&config).is_empty());
    }
}
