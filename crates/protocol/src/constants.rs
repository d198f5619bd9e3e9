use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default local port the daemon listens on for control connections.
pub const DEFAULT_DAEMON_PORT: u16 = 49737;

/// Default control endpoint of a locally running daemon.
pub const DEFAULT_DAEMON_URL: &str = "ws://127.0.0.1:49737";

/// Timeout for request/response operations on the control channel.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Interval between liveness probes.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Maximum control message size in bytes (1 MB).
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

/// Control channel message type identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "ping")]
    Ping,
    #[serde(rename = "pong")]
    Pong,
    #[serde(rename = "get_status")]
    GetStatus,
    #[serde(rename = "status")]
    Status,
    #[serde(rename = "error")]
    Error,

    /// Catch-all for message types added by newer daemons.
    #[serde(other)]
    Unknown,
}
