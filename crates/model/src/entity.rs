use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Entity attribute mapping (string keys, heterogeneous JSON values).
pub type Attributes = BTreeMap<String, serde_json::Value>;

/// Entity identifier of the form `domain.object_id`.
///
/// Exactly one `.`, both segments non-empty, lowercase
/// alphanumeric-plus-underscore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    pub fn parse(raw: &str) -> Result<Self> {
        let mut segments = raw.splitn(3, '.');
        let domain = segments.next().unwrap_or("");
        let object_id = segments.next().unwrap_or("");
        if domain.is_empty() || object_id.is_empty() || segments.next().is_some() {
            return Err(ModelError::InvalidEntityId(raw.to_string()));
        }
        let valid = |s: &str| {
            s.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        };
        if !valid(domain) || !valid(object_id) {
            return Err(ModelError::InvalidEntityId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Domain segment (left of the dot).
    pub fn domain(&self) -> &str {
        self.0.split('.').next().unwrap_or("")
    }

    /// Object id segment (right of the dot).
    pub fn object_id(&self) -> &str {
        self.0.split_once('.').map(|(_, o)| o).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EntityId {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

/// An entity under consideration for helper classification.
///
/// Built fresh per analysis run from the live snapshot plus the persisted
/// entity registry; never mutated after classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelperCandidate {
    pub entity_id: EntityId,

    /// Live attribute mapping; `None` means the attribute lookup failed
    /// (entity vanished mid-run or the store errored).
    pub attributes: Option<Attributes>,

    /// Platform declared by the entity registry, when the registry knows
    /// this entity.
    pub platform: Option<String>,

    /// Config-entry marker from the entity registry. Present means the
    /// entity was instantiated by an installed integration.
    pub config_entry_id: Option<String>,
}

impl HelperCandidate {
    pub fn new(entity_id: EntityId) -> Self {
        Self {
            entity_id,
            attributes: None,
            platform: None,
            config_entry_id: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Attributes) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    pub fn with_config_entry(mut self, config_entry_id: impl Into<String>) -> Self {
        self.config_entry_id = Some(config_entry_id.into());
        self
    }
}
