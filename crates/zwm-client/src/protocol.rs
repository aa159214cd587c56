//! Websocket message types
//!
//! Outgoing commands and the inbound envelope shared by every server message.

use serde::{Deserialize, Serialize};
use zwm_core::RegistryCategory;

// =============================================================================
// Outgoing Messages
// =============================================================================

/// Command sent to Home Assistant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Command<'a> {
    #[serde(rename = "auth")]
    Auth { access_token: &'a str },
    #[serde(rename = "config/device_registry/list")]
    DeviceRegistryList { id: u64 },
    #[serde(rename = "config/entity_registry/list")]
    EntityRegistryList { id: u64 },
    #[serde(rename = "config/entity_registry/update")]
    EntityRegistryUpdate {
        id: u64,
        entity_id: &'a str,
        new_entity_id: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<&'a str>,
    },
}

impl Command<'_> {
    /// List command for a registry
    pub fn list(category: RegistryCategory, id: u64) -> Self {
        match category {
            RegistryCategory::Devices => Command::DeviceRegistryList { id },
            RegistryCategory::Entities => Command::EntityRegistryList { id },
        }
    }
}

// =============================================================================
// Inbound Messages
// =============================================================================

/// Any message received from Home Assistant
///
/// Auth phase messages carry only `type` (and `message` on failure); command
/// results carry `id`, `success` and either `result` or `error`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type", default)]
    pub msg_type: Option<String>,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<ErrorInfo>,
    #[serde(default)]
    pub message: Option<String>,
}

impl InboundMessage {
    pub fn is_type(&self, msg_type: &str) -> bool {
        self.msg_type.as_deref() == Some(msg_type)
    }

    /// Only an explicit `success: true` counts
    pub fn is_success(&self) -> bool {
        self.success == Some(true)
    }
}

/// Error details attached to a failed result
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}
