//! Error types for the reconciliation engine

use thiserror::Error;
use zwm_core::NodeId;

use crate::extract::ExtractError;

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Registry inconsistencies found while building a node map
///
/// Each of these aborts the run: continuing would silently drop entities
/// from the rename plan.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    /// A device key could not be turned into a node id
    #[error("{platform} device {device_id}: {source}")]
    Extract {
        platform: String,
        device_id: String,
        #[source]
        source: ExtractError,
    },

    /// An entity references a device the integration does not own
    #[error("{platform} entity {entity_id} references unknown device {device_id}")]
    UnknownDevice {
        platform: String,
        entity_id: String,
        device_id: String,
    },

    /// An entity is not attached to any device
    #[error("{platform} entity {entity_id} has no device")]
    MissingDevice { platform: String, entity_id: String },

    /// Two devices of one integration claim the same physical node
    #[error("{platform} devices {first} and {second} both map to node {node_id}")]
    DuplicateNode {
        platform: String,
        node_id: NodeId,
        first: String,
        second: String,
    },
}

/// Errors that abort a migration run
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("registry inconsistency: {0}")]
    Graph(#[from] GraphError),
}
