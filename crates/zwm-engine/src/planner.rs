//! Rename planning
//!
//! For every Z-Wave JS entity decide which OpenZWave entity id it should
//! take over. Only two rules produce a target: an operator override, or a
//! domain that has exactly one entity on both sides of the node. Everything
//! else is left for the operator; a wrong automatic rename would silently
//! break automations bound to the old id.

use tracing::warn;
use zwm_config::OverrideTable;
use zwm_core::{domain_of, EntityNames, NodeEntityMap, NodeId};

/// How a Z-Wave JS entity's target was decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Taken from the override table
    Manual { target: String },
    /// Only entity of its domain on both the Z-Wave JS and OpenZWave node
    UniqueTypeMatch { target: String },
    /// No safe target; `candidates` are the same-domain OpenZWave entities
    Unresolved { candidates: Vec<String> },
}

impl Resolution {
    pub fn target(&self) -> Option<&str> {
        match self {
            Resolution::Manual { target } | Resolution::UniqueTypeMatch { target } => Some(target),
            Resolution::Unresolved { .. } => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Manual { .. } => "manual",
            Resolution::UniqueTypeMatch { .. } => "unique-type-match",
            Resolution::Unresolved { .. } => "unresolved",
        }
    }
}

/// Decision for one Z-Wave JS entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub node_id: NodeId,
    /// Z-Wave JS entity id
    pub source: String,
    pub resolution: Resolution,
}

impl PlanEntry {
    pub fn target(&self) -> Option<&str> {
        self.resolution.target()
    }
}

/// Decisions for every entity of one Z-Wave JS node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePlan {
    pub node_id: NodeId,
    /// The OpenZWave map has no node with this id
    pub counterpart_missing: bool,
    pub entries: Vec<PlanEntry>,
}

impl NodePlan {
    /// At least one entity of the node has a target
    pub fn has_target(&self) -> bool {
        self.entries.iter().any(|entry| entry.target().is_some())
    }
}

/// The full rename plan, in Z-Wave JS node order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenamePlan {
    pub nodes: Vec<NodePlan>,
}

impl RenamePlan {
    pub fn entries(&self) -> impl Iterator<Item = &PlanEntry> {
        self.nodes.iter().flat_map(|node| node.entries.iter())
    }

    pub fn resolved(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries().filter(|entry| entry.target().is_some())
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries().filter(|entry| entry.target().is_none())
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&NodePlan> {
        self.nodes.iter().find(|node| &node.node_id == node_id)
    }
}

/// Plan a target for every entity in `zwave_js`
///
/// `ozw` must carry the pre-shadow (bare) OpenZWave entity ids. A Z-Wave JS
/// node with no OpenZWave counterpart does not abort planning: its entities
/// fall back to overrides or stay unresolved without candidates.
pub fn plan_renames(
    zwave_js: &NodeEntityMap,
    ozw: &NodeEntityMap,
    overrides: &OverrideTable,
) -> RenamePlan {
    let empty = EntityNames::new();
    let nodes = zwave_js
        .iter()
        .map(|(node_id, zjs_node)| {
            let counterpart = ozw.get(node_id);
            if counterpart.is_none() {
                warn!("Node {} has no OpenZWave counterpart", node_id);
            }
            let ozw_node = counterpart.unwrap_or(&empty);

            let entries = zjs_node
                .keys()
                .map(|zjs_entity| PlanEntry {
                    node_id: node_id.clone(),
                    source: zjs_entity.clone(),
                    resolution: resolve(zjs_entity, zjs_node, ozw_node, overrides),
                })
                .collect();

            NodePlan {
                node_id: node_id.clone(),
                counterpart_missing: counterpart.is_none(),
                entries,
            }
        })
        .collect();

    RenamePlan { nodes }
}

fn resolve(
    zjs_entity: &str,
    zjs_node: &EntityNames,
    ozw_node: &EntityNames,
    overrides: &OverrideTable,
) -> Resolution {
    if let Some(target) = overrides.get(zjs_entity) {
        return Resolution::Manual {
            target: target.to_string(),
        };
    }

    let entity_type = domain_of(zjs_entity);
    let zjs_same_type = same_domain(zjs_node, entity_type).count();
    let ozw_same_type: Vec<String> = same_domain(ozw_node, entity_type)
        .map(String::from)
        .collect();

    if zjs_same_type == 1 && ozw_same_type.len() == 1 {
        return Resolution::UniqueTypeMatch {
            target: ozw_same_type[0].clone(),
        };
    }
    Resolution::Unresolved {
        candidates: ozw_same_type,
    }
}

fn same_domain<'a>(node: &'a EntityNames, domain: &'a str) -> impl Iterator<Item = &'a str> {
    node.keys()
        .map(String::as_str)
        .filter(move |entity_id| domain_of(entity_id) == domain)
}
