use crate::entity::EntityId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of configuration surface a reference was found in.
///
/// The kind decides how a reference counts during reconciliation:
/// config files, templates, and integration entries make a helper
/// actively used; dashboard references alone do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    ConfigFile,
    Template,
    Dashboard,
    IntegrationEntry,
}

impl SourceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            SourceKind::ConfigFile => "config_file",
            SourceKind::Template => "template",
            SourceKind::Dashboard => "dashboard",
            SourceKind::IntegrationEntry => "integration_entry",
        }
    }

    /// Whether a reference from this kind of source makes a helper
    /// actively used on its own.
    pub const fn is_automation_surface(self) -> bool {
        !matches!(self, SourceKind::Dashboard)
    }
}

/// One origin of entity references: a config file, a named UI template,
/// a dashboard file, or an integration config entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceSource {
    pub kind: SourceKind,

    /// Identifying label: file name or title.
    pub label: String,
}

impl ReferenceSource {
    pub fn new(kind: SourceKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }

    pub fn config_file(label: impl Into<String>) -> Self {
        Self::new(SourceKind::ConfigFile, label)
    }

    pub fn template(label: impl Into<String>) -> Self {
        Self::new(SourceKind::Template, label)
    }

    pub fn dashboard(label: impl Into<String>) -> Self {
        Self::new(SourceKind::Dashboard, label)
    }

    pub fn integration_entry(label: impl Into<String>) -> Self {
        Self::new(SourceKind::IntegrationEntry, label)
    }
}

impl fmt::Display for ReferenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.label)
    }
}

/// Provenance edge: this source's text mentions this entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReferenceEdge {
    pub source: ReferenceSource,
    pub entity: EntityId,
}
