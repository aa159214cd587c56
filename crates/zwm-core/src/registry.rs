//! Device and entity records as returned by the registry list commands
//!
//! Only the fields the migration needs are modelled; everything else in the
//! registry payload is ignored on deserialization.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which registry a list command targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryCategory {
    Devices,
    Entities,
}

impl fmt::Display for RegistryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryCategory::Devices => f.write_str("devices"),
            RegistryCategory::Entities => f.write_str("entities"),
        }
    }
}

/// A device identifier (integration, key) pair
///
/// The key can be either a string or an integer in the JSON, but is stored
/// as String. Tuples with more than two elements have their trailing parts
/// joined with `:`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DeviceIdentifier(pub String, pub String);

impl<'de> Deserialize<'de> for DeviceIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, SeqAccess, Visitor};

        struct DeviceIdentifierVisitor;

        impl<'de> Visitor<'de> for DeviceIdentifierVisitor {
            type Value = DeviceIdentifier;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a tuple of [integration, key, ...]")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let integration: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;

                let mut key_parts: Vec<String> = Vec::new();
                while let Some(value) = seq.next_element::<serde_json::Value>()? {
                    let part = match value {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Number(n) => n.to_string(),
                        _ => return Err(de::Error::custom("key parts must be string or number")),
                    };
                    key_parts.push(part);
                }

                if key_parts.is_empty() {
                    return Err(de::Error::invalid_length(1, &self));
                }

                Ok(DeviceIdentifier(integration, key_parts.join(":")))
            }
        }

        deserializer.deserialize_seq(DeviceIdentifierVisitor)
    }
}

impl DeviceIdentifier {
    pub fn new(integration: impl Into<String>, key: impl Into<String>) -> Self {
        Self(integration.into(), key.into())
    }

    /// Integration (platform) that registered the device
    pub fn integration(&self) -> &str {
        &self.0
    }

    /// Integration-specific key, e.g. `3672945806-47` or `1.46.1`
    pub fn key(&self) -> &str {
        &self.1
    }
}

/// A device registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceEntry {
    /// Registry device id
    pub id: String,
    /// Identifier tuples; only the first one decides ownership
    #[serde(default)]
    pub identifiers: Vec<DeviceIdentifier>,
}

impl DeviceEntry {
    pub fn new(id: impl Into<String>, identifiers: Vec<DeviceIdentifier>) -> Self {
        Self {
            id: id.into(),
            identifiers,
        }
    }

    /// The identifier consulted for integration ownership and node lookup
    pub fn primary_identifier(&self) -> Option<&DeviceIdentifier> {
        self.identifiers.first()
    }

    /// Whether the first identifier belongs to `integration`
    pub fn belongs_to(&self, integration: &str) -> bool {
        self.primary_identifier()
            .is_some_and(|identifier| identifier.integration() == integration)
    }
}

/// An entity registry entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEntry {
    /// Full entity ID (domain.object_id)
    pub entity_id: String,
    /// Parent device ID
    #[serde(default)]
    pub device_id: Option<String>,
    /// Integration that provides this entity
    pub platform: String,
    /// User-set display name
    #[serde(default)]
    pub name: Option<String>,
}

impl EntityEntry {
    pub fn new(
        entity_id: impl Into<String>,
        device_id: Option<&str>,
        platform: impl Into<String>,
        name: Option<&str>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            device_id: device_id.map(String::from),
            platform: platform.into(),
            name: name.map(String::from),
        }
    }
}
