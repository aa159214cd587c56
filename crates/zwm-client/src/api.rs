use async_trait::async_trait;
use zwm_core::{DeviceEntry, EntityEntry};

/// The registry operations the migration engine needs
///
/// Failures are reported as values: listings yield `None` ("no data") and
/// renames yield `false`. The implementation logs the cause; the caller
/// decides whether to continue.
#[async_trait]
pub trait RegistryApi: Send {
    /// Full device registry
    async fn list_devices(&mut self) -> Option<Vec<DeviceEntry>>;

    /// Full entity registry
    async fn list_entities(&mut self) -> Option<Vec<EntityEntry>>;

    /// Rename `entity_id` to `new_entity_id`, optionally setting its display name
    async fn rename_entity(
        &mut self,
        entity_id: &str,
        new_entity_id: &str,
        name: Option<&str>,
    ) -> bool;
}
