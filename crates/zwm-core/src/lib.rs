//! Core types for the Z-Wave migration tool
//!
//! This crate provides the records read from the Home Assistant registries
//! (devices and entities), the entity id helpers used for domain matching,
//! and the per-node entity maps that the reconciliation engine works on.

mod entity_id;
mod node;
mod registry;
mod shadow;

pub use entity_id::{domain_of, EntityId, EntityIdError};
pub use node::{EntityNames, NodeEntityMap, NodeId};
pub use registry::{DeviceEntry, DeviceIdentifier, EntityEntry, RegistryCategory};
pub use shadow::{bare_id, is_shadowed, shadow_id, unshadow_id};

/// Platform name of the legacy OpenZWave integration
pub const OZW_PLATFORM: &str = "ozw";

/// Platform name of the Z-Wave JS integration
pub const ZWAVE_JS_PLATFORM: &str = "zwave_js";

/// Suffix appended to OpenZWave entity ids to free them for Z-Wave JS entities
pub const SHADOW_SUFFIX: &str = "_ozwmigration";
