//! WebSocket client for the daemon control channel.
//!
//! Requests are strictly sequential: one request is in flight at a time and
//! its reply is matched by UUID. Frames that arrive in between are either
//! answered (daemon pings) or dropped.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite};
use tracing::{debug, trace};

use hyperdaemon_protocol::constants::{MAX_MESSAGE_SIZE, REQUEST_TIMEOUT};
use hyperdaemon_protocol::{DaemonStatus, Message, MessageType};
use hyperdaemon_supervisor::{BoxFuture, ClientFactory, DaemonClient, DaemonError};

use crate::error::ClientError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A single control connection to a daemon.
///
/// Created unconnected; [`WsDaemonClient::connect`] (or `ready` through the
/// [`DaemonClient`] trait) opens the socket.
pub struct WsDaemonClient {
    url: String,
    timeout: Duration,
    conn: Mutex<Option<WsStream>>,
}

impl WsDaemonClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            conn: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Opens the WebSocket, replacing any previous connection.
    pub async fn connect(&self) -> Result<(), ClientError> {
        let mut ws_config = WebSocketConfig::default();
        ws_config.max_message_size = Some(MAX_MESSAGE_SIZE);
        ws_config.max_frame_size = Some(MAX_MESSAGE_SIZE);

        let connect =
            tokio_tungstenite::connect_async_with_config(self.url.as_str(), Some(ws_config), false);
        let (stream, _) = tokio::time::timeout(self.timeout, connect)
            .await
            .map_err(|_| ClientError::Timeout)??;

        debug!(url = %self.url, "control channel connected");
        *self.conn.lock().await = Some(stream);
        Ok(())
    }

    /// Round-trips a `ping` envelope.
    pub async fn ping(&self) -> Result<(), ClientError> {
        let reply = self.request(MessageType::Ping).await?;
        match reply.msg_type {
            MessageType::Pong => Ok(()),
            other => Err(ClientError::UnexpectedReply(other)),
        }
    }

    /// Asks the daemon for its status report.
    pub async fn get_status(&self) -> Result<DaemonStatus, ClientError> {
        let reply = self.request(MessageType::GetStatus).await?;
        if reply.msg_type != MessageType::Status {
            return Err(ClientError::UnexpectedReply(reply.msg_type));
        }
        Ok(reply.parse_payload()?.unwrap_or_default())
    }

    /// Closes the socket. A connection that is already gone is ignored.
    pub async fn disconnect(&self) {
        if let Some(mut stream) = self.conn.lock().await.take() {
            if let Err(e) = stream.close(None).await {
                trace!(error = %e, "close handshake failed");
            }
            debug!(url = %self.url, "control channel closed");
        }
    }

    /// Sends a payload-less request and waits for the matching reply.
    ///
    /// Any transport failure drops the connection.
    pub async fn request(&self, msg_type: MessageType) -> Result<Message, ClientError> {
        let mut guard = self.conn.lock().await;
        let stream = guard.as_mut().ok_or(ClientError::NotConnected)?;

        let id = uuid::Uuid::new_v4().to_string();
        let result = tokio::time::timeout(self.timeout, exchange(stream, &id, msg_type))
            .await
            .unwrap_or(Err(ClientError::Timeout));

        if matches!(
            result,
            Err(ClientError::Ws(_) | ClientError::Closed | ClientError::Timeout)
        ) {
            *guard = None;
        }

        let reply = result?;
        if let Some(err) = reply.error {
            return Err(ClientError::Remote {
                code: err.code,
                message: err.message,
            });
        }
        Ok(reply)
    }
}

async fn exchange(
    stream: &mut WsStream,
    id: &str,
    msg_type: MessageType,
) -> Result<Message, ClientError> {
    let msg = Message::new::<()>(id, msg_type, None)?;
    let json = serde_json::to_string(&msg)?;
    stream.send(tungstenite::Message::Text(json.into())).await?;

    loop {
        let frame = match stream.next().await {
            Some(frame) => frame?,
            None => return Err(ClientError::Closed),
        };

        match frame {
            tungstenite::Message::Text(text) => {
                let incoming: Message = match serde_json::from_str(&text) {
                    Ok(m) => m,
                    Err(e) => {
                        debug!(error = %e, "ignoring malformed frame");
                        continue;
                    }
                };

                if incoming.id == id {
                    return Ok(incoming);
                }

                if incoming.msg_type == MessageType::Ping {
                    trace!("answering daemon ping");
                    let pong = incoming.reply::<()>(MessageType::Pong, None)?;
                    let json = serde_json::to_string(&pong)?;
                    stream.send(tungstenite::Message::Text(json.into())).await?;
                } else {
                    trace!(msg_type = ?incoming.msg_type, "ignoring unsolicited message");
                }
            }
            tungstenite::Message::Close(_) => return Err(ClientError::Closed),
            _ => {} // Ping/Pong frames are handled by tungstenite; binary is unused.
        }
    }
}

impl DaemonClient for WsDaemonClient {
    fn ready(&self) -> BoxFuture<'_, Result<(), DaemonError>> {
        Box::pin(async move {
            self.connect().await?;
            self.ping().await?;
            Ok(())
        })
    }

    fn status(&self) -> BoxFuture<'_, Result<DaemonStatus, DaemonError>> {
        Box::pin(async move { Ok(self.get_status().await?) })
    }

    fn close(&self) -> BoxFuture<'_, ()> {
        Box::pin(self.disconnect())
    }
}

/// Creates [`WsDaemonClient`]s for a fixed endpoint.
#[derive(Debug, Clone)]
pub struct WsClientFactory {
    url: String,
    timeout: Duration,
}

impl WsClientFactory {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl ClientFactory for WsClientFactory {
    fn create(&self) -> Box<dyn DaemonClient> {
        Box::new(WsDaemonClient::with_timeout(self.url.clone(), self.timeout))
    }
}
