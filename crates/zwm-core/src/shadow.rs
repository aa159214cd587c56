//! Shadow suffix handling for OpenZWave entity ids

use crate::SHADOW_SUFFIX;

/// Id an OpenZWave entity is moved to while Z-Wave JS takes over its id
pub fn shadow_id(entity_id: &str) -> String {
    format!("{}{}", entity_id, SHADOW_SUFFIX)
}

/// The original id of a shadowed entity, or `None` if it is not shadowed
pub fn unshadow_id(entity_id: &str) -> Option<&str> {
    entity_id.strip_suffix(SHADOW_SUFFIX)
}

pub fn is_shadowed(entity_id: &str) -> bool {
    entity_id.ends_with(SHADOW_SUFFIX)
}

/// The id without the shadow suffix, whether or not it carries one
pub fn bare_id(entity_id: &str) -> &str {
    unshadow_id(entity_id).unwrap_or(entity_id)
}
