//! Error types for configuration loading

use std::path::PathBuf;
use thiserror::Error;
use zwm_core::EntityIdError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while resolving run configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file
    #[error("failed to read file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML
    #[error("failed to parse YAML in {path}: {source}")]
    ParseYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Override entry is not a valid entity id
    #[error("invalid override entity id '{entity_id}' in {path}: {source}")]
    InvalidEntityId {
        path: PathBuf,
        entity_id: String,
        #[source]
        source: EntityIdError,
    },

    /// Override renames across domains, which the registry refuses
    #[error("override '{from}' -> '{to}' in {path} changes the entity domain")]
    DomainMismatch {
        path: PathBuf,
        from: String,
        to: String,
    },

    /// No access token was supplied
    #[error("no access token: pass --access-token or set HA_ACCESS_TOKEN")]
    MissingAccessToken,

    /// Invalid configuration value
    #[error("invalid configuration value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}
