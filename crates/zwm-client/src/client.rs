//! Websocket registry client

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};
use zwm_core::{DeviceEntry, EntityEntry, RegistryCategory};

use crate::api::RegistryApi;
use crate::error::{ClientError, ClientResult};
use crate::protocol::{Command, InboundMessage};
use crate::sequence::SequenceGenerator;

/// Client for the Home Assistant websocket API
///
/// Generic over the underlying byte stream so tests can run it over an
/// in-memory pipe; production code uses [`RegistryClient::connect`].
pub struct RegistryClient<S = MaybeTlsStream<TcpStream>> {
    stream: WebSocketStream<S>,
    ids: SequenceGenerator,
    /// Correlation table: in-flight request id -> response, once received
    pending: HashMap<u64, Option<InboundMessage>>,
    request_timeout: Duration,
}

impl RegistryClient {
    /// Open a websocket connection to `url` (e.g. `ws://host:8123/api/websocket`)
    pub async fn connect(url: &str, request_timeout: Duration) -> ClientResult<Self> {
        debug!("Connecting to {}", url);
        let (stream, _) = timeout(request_timeout, connect_async(url))
            .await
            .map_err(|_| ClientError::Timeout(request_timeout))??;
        info!("Connected to {}", url);
        Ok(Self::from_stream(stream, request_timeout))
    }
}

impl<S> RegistryClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already established websocket stream
    pub fn from_stream(stream: WebSocketStream<S>, request_timeout: Duration) -> Self {
        Self {
            stream,
            ids: SequenceGenerator::new(),
            pending: HashMap::new(),
            request_timeout,
        }
    }

    /// Send the access token and wait for `auth_ok`
    ///
    /// Messages other than `auth_ok` (such as `auth_required`) are discarded.
    /// `auth_invalid`, a closed channel or a timeout are fatal.
    pub async fn authenticate(&mut self, access_token: &str) -> ClientResult<()> {
        self.send(&Command::Auth { access_token }).await?;

        loop {
            let message = self.recv().await?;
            if message.is_type("auth_ok") {
                info!("Authenticated with Home Assistant");
                return Ok(());
            }
            if message.is_type("auth_invalid") {
                return Err(ClientError::AuthInvalid(
                    message.message.unwrap_or_else(|| "invalid access token".to_string()),
                ));
            }
            debug!("Discarding {:?} while waiting for auth_ok", message.msg_type);
        }
    }

    /// List a whole registry
    ///
    /// Any transport, correlation or decoding failure is logged and yields
    /// `None`.
    pub async fn list<T: DeserializeOwned>(&mut self, category: RegistryCategory) -> Option<Vec<T>> {
        let id = self.ids.next_id();
        let response = match self.exchange(id, &Command::list(category, id)).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to list {} (request {}): {}", category, id, e);
                return None;
            }
        };

        if response.success == Some(false) {
            warn!("Registry refused to list {}: {:?}", category, response.error);
            return None;
        }
        let Some(result) = response.result else {
            warn!("Response to request {} carried no {} result", id, category);
            return None;
        };

        match serde_json::from_value::<Vec<T>>(result) {
            Ok(items) => {
                debug!("Listed {} {}", items.len(), category);
                Some(items)
            }
            Err(e) => {
                warn!("Malformed {} listing: {}", category, e);
                None
            }
        }
    }

    /// Id the next request will use
    pub fn next_request_id(&self) -> u64 {
        self.ids.peek()
    }

    /// Send a command and wait for the response carrying `id`
    async fn exchange(&mut self, id: u64, command: &Command<'_>) -> ClientResult<InboundMessage> {
        self.pending.insert(id, None);
        let result = match self.send(command).await {
            Ok(()) => self.await_response(id).await,
            Err(e) => Err(e),
        };
        self.pending.remove(&id);
        result
    }

    /// Wait for the response to `id`
    ///
    /// A response for another id that is registered in `pending` but not
    /// yet awaited is parked there for its own caller; anything else is
    /// discarded.
    async fn await_response(&mut self, id: u64) -> ClientResult<InboundMessage> {
        if let Some(parked) = self.pending.get_mut(&id).and_then(Option::take) {
            return Ok(parked);
        }

        loop {
            let message = self.recv().await?;
            match message.id {
                Some(received) if received == id => return Ok(message),
                Some(received) if matches!(self.pending.get(&received), Some(None)) => {
                    debug!("Parking response {} while waiting for {}", received, id);
                    self.pending.insert(received, Some(message));
                }
                _ => warn!("Discarding message while waiting for {}: {:?}", id, message),
            }
        }
    }

    async fn send(&mut self, command: &Command<'_>) -> ClientResult<()> {
        let text = serde_json::to_string(command)?;
        trace!("Sending {}", text);
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    /// Receive the next JSON message, bounded by the request timeout
    ///
    /// Frames that do not decode as a message are discarded; only a closed
    /// channel, a transport error or the timeout fail the receive.
    async fn recv(&mut self) -> ClientResult<InboundMessage> {
        let wait = self.request_timeout;
        loop {
            let frame = timeout(wait, self.stream.next())
                .await
                .map_err(|_| ClientError::Timeout(wait))?
                .ok_or(ClientError::Closed)??;

            match frame {
                Message::Text(text) => {
                    trace!("Received {}", text);
                    match serde_json::from_str(&text) {
                        Ok(message) => return Ok(message),
                        Err(e) => warn!("Discarding unparseable message ({}): {}", e, text),
                    }
                }
                Message::Close(_) => return Err(ClientError::Closed),
                Message::Binary(data) => warn!("Discarding {} byte binary frame", data.len()),
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            }
        }
    }
}

#[async_trait]
impl<S> RegistryApi for RegistryClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn list_devices(&mut self) -> Option<Vec<DeviceEntry>> {
        self.list(RegistryCategory::Devices).await
    }

    async fn list_entities(&mut self) -> Option<Vec<EntityEntry>> {
        self.list(RegistryCategory::Entities).await
    }

    async fn rename_entity(
        &mut self,
        entity_id: &str,
        new_entity_id: &str,
        name: Option<&str>,
    ) -> bool {
        let id = self.ids.next_id();
        let command = Command::EntityRegistryUpdate {
            id,
            entity_id,
            new_entity_id,
            name,
        };

        match self.exchange(id, &command).await {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                warn!(
                    "Registry rejected rename of {}: {:?}",
                    entity_id, response.error
                );
                false
            }
            Err(e) => {
                warn!("Error renaming {}: {}", entity_id, e);
                false
            }
        }
    }
}
