//! Manual override table
//!
//! Maps a Z-Wave JS entity id to the OpenZWave entity id it should take
//! over. Entries always win over automatic matching.

use crate::error::{ConfigError, ConfigResult};
use indexmap::IndexMap;
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use zwm_core::EntityId;

/// Value the report writes for entries the operator still has to fill in
pub const PLACEHOLDER: &str = "??";

/// Operator-supplied `entity_id -> entity_id` renames
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideTable {
    entries: IndexMap<String, String>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, from: EntityId, to: EntityId) {
        self.entries.insert(from.to_string(), to.to_string());
    }

    /// Target for a Z-Wave JS entity, if the operator named one
    pub fn get(&self, entity_id: &str) -> Option<&str> {
        self.entries.get(entity_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a YAML override file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Loading overrides from {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_yaml_str(&content, path)
    }

    /// Parse override YAML; `source_path` is only used in diagnostics
    pub fn from_yaml_str(content: &str, source_path: &Path) -> ConfigResult<Self> {
        let value: Value = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseYaml {
            path: source_path.to_path_buf(),
            source: e,
        })?;

        let mapping = match value {
            Value::Null => return Ok(Self::new()),
            Value::Mapping(mapping) => mapping,
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: source_path.display().to_string(),
                    reason: "override file must be a mapping of entity ids".to_string(),
                })
            }
        };

        let mut table = Self::new();
        for (key, target) in mapping {
            let from = match key {
                Value::String(from) => from,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: format!("{:?}", other),
                        reason: "override keys must be entity ids".to_string(),
                    })
                }
            };

            let to = match target {
                Value::String(to) if to != PLACEHOLDER => to,
                Value::String(_) | Value::Null => {
                    warn!("Override for {} has no target yet, skipping", from);
                    continue;
                }
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: from,
                        reason: format!("expected an entity id, got {:?}", other),
                    })
                }
            };

            let from_id = parse_entity_id(&from, source_path)?;
            let to_id = parse_entity_id(&to, source_path)?;
            if from_id.domain() != to_id.domain() {
                return Err(ConfigError::DomainMismatch {
                    path: source_path.to_path_buf(),
                    from,
                    to,
                });
            }
            table.insert(from_id, to_id);
        }

        debug!("Loaded {} overrides", table.len());
        Ok(table)
    }
}

fn parse_entity_id(entity_id: &str, source_path: &Path) -> ConfigResult<EntityId> {
    entity_id
        .parse()
        .map_err(|source| ConfigError::InvalidEntityId {
            path: source_path.to_path_buf(),
            entity_id: entity_id.to_string(),
            source,
        })
}
