//! Home Assistant registry client
//!
//! Talks to the Home Assistant websocket API to list the device and entity
//! registries and to rename entities.
//!
//! # Protocol invariant
//!
//! Requests are issued strictly one at a time. Each request allocates a
//! fresh id from the client's [`SequenceGenerator`] and the client then
//! reads inbound messages until the response carrying that id arrives.
//! Messages for other in-flight ids are parked in a correlation table;
//! anything else is discarded with a diagnostic. Pipelining requests
//! without awaiting each response is not supported.
//!
//! # Example
//!
//! ```ignore
//! use zwm_client::{RegistryApi, RegistryClient};
//!
//! let mut client = RegistryClient::connect(url, timeout).await?;
//! client.authenticate(&token).await?;
//! let devices = client.list_devices().await.unwrap_or_default();
//! ```

mod api;
mod client;
mod error;
mod protocol;
mod sequence;

pub use api::RegistryApi;
pub use client::RegistryClient;
pub use error::{ClientError, ClientResult};
pub use protocol::{Command, ErrorInfo, InboundMessage};
pub use sequence::SequenceGenerator;
