//! Node entity map construction
//!
//! Lists the registries through [`RegistryApi`], keeps what belongs to one
//! integration and folds it into a [`NodeEntityMap`].

use std::collections::HashMap;

use tracing::{debug, warn};
use zwm_client::RegistryApi;
use zwm_core::{DeviceEntry, EntityEntry, NodeEntityMap, NodeId};

use crate::error::GraphError;
use crate::extract::{Integration, NodeIdExtractor};

/// Devices whose first identifier belongs to `platform`
///
/// A registry that returns no data is treated as having no devices.
pub async fn devices_for<A>(api: &mut A, platform: &str) -> Vec<DeviceEntry>
where
    A: RegistryApi + ?Sized,
{
    let Some(devices) = api.list_devices().await else {
        warn!("No device data from the registry, assuming no {} devices", platform);
        return Vec::new();
    };
    devices
        .into_iter()
        .filter(|device| device.belongs_to(platform))
        .collect()
}

/// Entities provided by `platform`
pub async fn entities_for<A>(api: &mut A, platform: &str) -> Vec<EntityEntry>
where
    A: RegistryApi + ?Sized,
{
    let Some(entities) = api.list_entities().await else {
        warn!("No entity data from the registry, assuming no {} entities", platform);
        return Vec::new();
    };
    entities
        .into_iter()
        .filter(|entity| entity.platform == platform)
        .collect()
}

/// List both registries and build the node map for one integration
pub async fn build_node_map<A>(
    api: &mut A,
    integration: &Integration,
) -> Result<NodeEntityMap, GraphError>
where
    A: RegistryApi + ?Sized,
{
    let entities = entities_for(api, integration.platform).await;
    let devices = devices_for(api, integration.platform).await;
    let map = fold_node_map(integration.platform, integration, &devices, &entities)?;
    debug!(
        "Built {} node map: {} nodes, {} entities",
        integration.platform,
        map.len(),
        map.entity_count()
    );
    Ok(map)
}

/// Fold one integration's devices and entities into a node map
///
/// Fails on a malformed device key, on two devices claiming the same node,
/// and on any entity whose device is not among `devices`.
pub fn fold_node_map(
    platform: &str,
    extractor: &dyn NodeIdExtractor,
    devices: &[DeviceEntry],
    entities: &[EntityEntry],
) -> Result<NodeEntityMap, GraphError> {
    let mut device_nodes: HashMap<&str, NodeId> = HashMap::with_capacity(devices.len());
    let mut node_devices: HashMap<NodeId, &str> = HashMap::with_capacity(devices.len());

    for device in devices {
        let Some(identifier) = device.primary_identifier() else {
            continue;
        };
        let node_id = extractor
            .extract(identifier.key())
            .map_err(|source| GraphError::Extract {
                platform: platform.to_string(),
                device_id: device.id.clone(),
                source,
            })?;

        if let Some(first) = node_devices.insert(node_id.clone(), device.id.as_str()) {
            return Err(GraphError::DuplicateNode {
                platform: platform.to_string(),
                node_id,
                first: first.to_string(),
                second: device.id.clone(),
            });
        }
        device_nodes.insert(device.id.as_str(), node_id);
    }

    let mut map = NodeEntityMap::new();
    for entity in entities {
        let device_id = entity
            .device_id
            .as_deref()
            .ok_or_else(|| GraphError::MissingDevice {
                platform: platform.to_string(),
                entity_id: entity.entity_id.clone(),
            })?;
        let node_id = device_nodes
            .get(device_id)
            .ok_or_else(|| GraphError::UnknownDevice {
                platform: platform.to_string(),
                entity_id: entity.entity_id.clone(),
                device_id: device_id.to_string(),
            })?;
        map.insert(node_id.clone(), entity.entity_id.clone(), entity.name.clone());
    }

    Ok(map)
}
