//! Physical node identifiers and the per-node entity maps built from them

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Identifier of one physical Z-Wave node, shared by both integrations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// entity_id -> display name, in registry listing order
pub type EntityNames = IndexMap<String, Option<String>>;

/// Node id -> entities registered on that node, for one integration
///
/// Nodes and entities keep the order in which the registry listed them so
/// that two runs over an unchanged registry walk them identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeEntityMap {
    nodes: IndexMap<NodeId, EntityNames>,
}

impl NodeEntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entity on a node, creating the node entry if needed
    pub fn insert(&mut self, node_id: NodeId, entity_id: impl Into<String>, name: Option<String>) {
        self.nodes
            .entry(node_id)
            .or_default()
            .insert(entity_id.into(), name);
    }

    pub fn get(&self, node_id: &NodeId) -> Option<&EntityNames> {
        self.nodes.get(node_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &EntityNames)> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    /// Every entity id across all nodes
    pub fn entity_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .values()
            .flat_map(|entities| entities.keys().map(String::as_str))
    }

    /// Display name of an entity, searching all nodes
    pub fn display_name(&self, entity_id: &str) -> Option<&str> {
        self.nodes
            .values()
            .find_map(|entities| entities.get(entity_id))
            .and_then(|name| name.as_deref())
    }

    /// Copy of the map with every entity id passed through `rename`
    ///
    /// Entities whose new id would clash with another entity's keep their
    /// current id, so two entities are never merged into one key.
    pub fn map_entity_ids(&self, rename: impl Fn(&str) -> String) -> Self {
        let mut kept: HashSet<&str> = HashSet::new();
        loop {
            let mut owners: HashMap<String, Vec<&str>> = HashMap::new();
            for entity_id in self.entity_ids() {
                let mapped = if kept.contains(entity_id) {
                    entity_id.to_string()
                } else {
                    rename(entity_id)
                };
                owners.entry(mapped).or_default().push(entity_id);
            }

            let before = kept.len();
            kept.extend(owners.into_values().filter(|ids| ids.len() > 1).flatten());
            if kept.len() == before {
                break;
            }
        }

        let nodes = self
            .nodes
            .iter()
            .map(|(node_id, entities)| {
                let entities = entities
                    .iter()
                    .map(|(entity_id, name)| {
                        let mapped = if kept.contains(entity_id.as_str()) {
                            entity_id.clone()
                        } else {
                            rename(entity_id)
                        };
                        (mapped, name.clone())
                    })
                    .collect();
                (node_id.clone(), entities)
            })
            .collect();
        Self { nodes }
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn entity_count(&self) -> usize {
        self.nodes.values().map(IndexMap::len).sum()
    }
}
