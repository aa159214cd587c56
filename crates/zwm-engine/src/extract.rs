//! Node id extraction from integration-specific device keys
//!
//! Z-Wave JS keys look like `3672945806-47` (home id, node id) and OpenZWave
//! keys like `1.47.1` (instance, node id, suffix). Both reduce to picking one
//! field of a delimited string, so a single [`DelimitedKey`] covers them.

use thiserror::Error;
use zwm_core::{NodeId, OZW_PLATFORM, ZWAVE_JS_PLATFORM};

/// Why a device key did not yield a node id
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("key '{key}' has {found} fields separated by '{separator}', expected {expected}")]
    FieldCount {
        key: String,
        separator: char,
        expected: usize,
        found: usize,
    },

    #[error("key '{key}' has an empty node id field")]
    EmptyNodeId { key: String },
}

/// Turns a device identifier key into a physical node id
pub trait NodeIdExtractor {
    fn extract(&self, key: &str) -> Result<NodeId, ExtractError>;
}

/// Picks field `index` of a key that must split into exactly `fields` parts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelimitedKey {
    separator: char,
    fields: usize,
    index: usize,
}

impl DelimitedKey {
    pub const fn new(separator: char, fields: usize, index: usize) -> Self {
        Self {
            separator,
            fields,
            index,
        }
    }
}

impl NodeIdExtractor for DelimitedKey {
    fn extract(&self, key: &str) -> Result<NodeId, ExtractError> {
        let parts: Vec<&str> = key.split(self.separator).collect();
        if parts.len() != self.fields {
            return Err(ExtractError::FieldCount {
                key: key.to_string(),
                separator: self.separator,
                expected: self.fields,
                found: parts.len(),
            });
        }

        let node_id = parts[self.index];
        if node_id.is_empty() {
            return Err(ExtractError::EmptyNodeId {
                key: key.to_string(),
            });
        }
        Ok(NodeId::new(node_id))
    }
}

/// One of the two integrations taking part in the migration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Integration {
    /// Platform name on entities and first element of device identifiers
    pub platform: &'static str,
    pub node_key: DelimitedKey,
}

impl NodeIdExtractor for Integration {
    fn extract(&self, key: &str) -> Result<NodeId, ExtractError> {
        self.node_key.extract(key)
    }
}

/// Z-Wave JS: `<home_id>-<node_id>`
pub const ZWAVE_JS: Integration = Integration {
    platform: ZWAVE_JS_PLATFORM,
    node_key: DelimitedKey::new('-', 2, 1),
};

/// OpenZWave: `<instance>.<node_id>.<suffix>`
pub const OZW: Integration = Integration {
    platform: OZW_PLATFORM,
    node_key: DelimitedKey::new('.', 3, 1),
};
