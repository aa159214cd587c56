//! Configuration for a migration run
//!
//! - [`Settings`] - resolved endpoint, token, mode and flags for one run
//! - [`OverrideTable`] - operator-maintained `zwave_js entity -> ozw entity`
//!   pairs loaded from YAML
//!
//! # Override file
//!
//! ```yaml
//! # Node 47 entities: light.master_bathroom_light
//! light.motionlight: light.master_bathroom_light
//! sensor.motionlight_power: "??"   # placeholders are skipped
//! ```

mod error;
mod overrides;
mod settings;

pub use error::{ConfigError, ConfigResult};
pub use overrides::{OverrideTable, PLACEHOLDER};
pub use settings::{RunMode, Settings, DEFAULT_REQUEST_TIMEOUT, DEFAULT_URL};
