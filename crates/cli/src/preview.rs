//! Deletion planner: turns the orphaned-helpers list into reviewable
//! preview and backup artifacts. Actually removing helpers is a host
//! service call and stays outside this tool.

use anyhow::{bail, Context, Result};
use helper_audit_model::{Attributes, EntityId, StateStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const TRULY_ORPHANED: &str = "truly_orphaned_helpers.txt";
const LEGACY_ORPHANED: &str = "orphaned_helpers.txt";
const PREVIEW_FILE: &str = "deletion_preview.txt";
const BACKUP_FILE: &str = "deletion_backup.json";

/// Snapshot of one helper slated for deletion; the backup a later delete
/// step restores from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionRecord {
    pub entity_id: EntityId,
    pub friendly_name: String,
    pub current_value: String,
    pub attributes: Attributes,
}

#[derive(Debug)]
pub struct PreviewOutput {
    pub planned: Vec<DeletionRecord>,
    pub missing: usize,
    pub preview_file: Option<PathBuf>,
    pub backup_file: Option<PathBuf>,
}

pub fn plan_deletion(results_dir: &Path, store: &dyn StateStore) -> Result<PreviewOutput> {
    let list_path = locate_list(results_dir)?;
    let content = fs::read_to_string(&list_path)
        .with_context(|| format!("cannot read {}", list_path.display()))?;

    let entries = parse_helper_list(&content);
    if entries.is_empty() {
        log::info!("No helpers to delete found in {}", list_path.display());
        return Ok(PreviewOutput {
            planned: Vec::new(),
            missing: 0,
            preview_file: None,
            backup_file: None,
        });
    }
    log::info!(
        "Found {} helpers in {}",
        entries.len(),
        list_path.display()
    );

    let mut planned = Vec::new();
    let mut missing = 0;
    for entity_id in entries {
        let Some(current_value) = store.state(&entity_id) else {
            log::info!("Helper {entity_id} not found (already deleted?)");
            missing += 1;
            continue;
        };
        let attributes = store.attributes(&entity_id).unwrap_or_default();
        let friendly_name = attributes
            .get("friendly_name")
            .and_then(|v| v.as_str())
            .unwrap_or(entity_id.as_str())
            .to_string();
        planned.push(DeletionRecord {
            entity_id,
            friendly_name,
            current_value,
            attributes,
        });
    }

    if planned.is_empty() {
        log::info!("No existing helpers found to delete");
        return Ok(PreviewOutput {
            planned,
            missing,
            preview_file: None,
            backup_file: None,
        });
    }

    // Each artifact is written independently; a failed preview must not
    // block the backup and vice versa.
    let preview_file = write_artifact(results_dir, PREVIEW_FILE, &render_preview(&planned));
    let backup_file = match serde_json::to_string_pretty(&planned) {
        Ok(json) => write_artifact(results_dir, BACKUP_FILE, &json),
        Err(err) => {
            log::error!("Failed to serialize deletion backup: {err}");
            None
        }
    };

    Ok(PreviewOutput {
        planned,
        missing,
        preview_file,
        backup_file,
    })
}

/// Prefer the list with no dashboard references; the legacy combined list
/// still works but needs a more careful review.
fn locate_list(results_dir: &Path) -> Result<PathBuf> {
    let truly = results_dir.join(TRULY_ORPHANED);
    if truly.is_file() {
        log::info!("Using {TRULY_ORPHANED} (no dashboard references)");
        return Ok(truly);
    }
    let legacy = results_dir.join(LEGACY_ORPHANED);
    if legacy.is_file() {
        log::warn!(
            "Using {LEGACY_ORPHANED} (may contain dashboard-only helpers - review carefully)"
        );
        return Ok(legacy);
    }
    bail!(
        "no orphaned helpers list in {} - run `helper-audit analyze` first",
        results_dir.display()
    )
}

/// Parse the editable list: one entity id per line, blank lines and `#`
/// comments (including trailing ones) ignored, malformed ids dropped.
fn parse_helper_list(content: &str) -> Vec<EntityId> {
    content
        .lines()
        .filter_map(|line| {
            let line = line.split('#').next().unwrap_or("").trim();
            let candidate = line.split_whitespace().next()?;
            match EntityId::parse(candidate) {
                Ok(entity_id) => Some(entity_id),
                Err(err) => {
                    log::warn!("Skipping list entry: {err}");
                    None
                }
            }
        })
        .collect()
}

fn render_preview(planned: &[DeletionRecord]) -> String {
    let mut content = String::new();
    content.push_str("# Helper Deletion Preview\n");
    content.push_str(&format!(
        "# {} helpers would be deleted\n\n",
        planned.len()
    ));
    for record in planned {
        content.push_str(&format!("Entity: {}\n", record.entity_id));
        content.push_str(&format!("  Name: {}\n", record.friendly_name));
        content.push_str(&format!("  Current Value: {}\n\n", record.current_value));
    }
    content
}

fn write_artifact(results_dir: &Path, name: &str, content: &str) -> Option<PathBuf> {
    let path = results_dir.join(name);
    match fs::write(&path, content) {
        Ok(()) => {
            log::info!("Wrote {}", path.display());
            Some(path)
        }
        Err(err) => {
            log::error!("Failed to write {}: {err}", path.display());
            None
        }
    }
}
