//! Resolved settings for one migration run

use crate::error::{ConfigError, ConfigResult};
use crate::overrides::OverrideTable;
use std::time::Duration;

/// Websocket endpoint used by the Home Assistant frontend on a default install
pub const DEFAULT_URL: &str = "ws://homeassistant.local:8123/api/websocket";

/// Bound on how long a single registry receive may wait
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Which of the two mutually exclusive passes to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Shadow OpenZWave entities and rename Z-Wave JS entities onto their ids
    #[default]
    Migrate,
    /// Strip the shadow suffix from OpenZWave entities
    Rollback,
}

/// Settings for a migration run
#[derive(Debug, Clone)]
pub struct Settings {
    /// Websocket URL of the Home Assistant API
    pub url: String,
    /// Long-lived access token
    pub access_token: String,
    pub mode: RunMode,
    /// Issue renames; without it every decision is only displayed
    pub commit: bool,
    /// Carry the OpenZWave display name over to the renamed entity
    pub copy_names: bool,
    /// Bound on each websocket receive
    pub request_timeout: Duration,
    pub overrides: OverrideTable,
}

impl Settings {
    /// Build settings for a dry-run migration against `url`
    ///
    /// Plain `http(s)://host:port` base URLs are converted to the websocket
    /// endpoint.
    pub fn new(url: &str, access_token: Option<String>) -> ConfigResult<Self> {
        let access_token = access_token
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingAccessToken)?;

        Ok(Self {
            url: websocket_url(url)?,
            access_token,
            mode: RunMode::default(),
            commit: false,
            copy_names: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            overrides: OverrideTable::new(),
        })
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_commit(mut self, commit: bool) -> Self {
        self.commit = commit;
        self
    }

    pub fn with_copy_names(mut self, copy_names: bool) -> Self {
        self.copy_names = copy_names;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> ConfigResult<Self> {
        if request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                key: "timeout".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        self.request_timeout = request_timeout;
        Ok(self)
    }

    pub fn with_overrides(mut self, overrides: OverrideTable) -> Self {
        self.overrides = overrides;
        self
    }
}

fn websocket_url(url: &str) -> ConfigResult<String> {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("ws://") || url.starts_with("wss://") {
        return Ok(url.to_string());
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        let base = url
            .replacen("http://", "ws://", 1)
            .replacen("https://", "wss://", 1);
        return Ok(format!("{}/api/websocket", base));
    }
    Err(ConfigError::InvalidValue {
        key: "url".to_string(),
        reason: format!("'{}' is not a ws://, wss://, http:// or https:// URL", url),
    })
}
