use hyperdaemon_protocol::MessageType;
use hyperdaemon_supervisor::DaemonError;
use tokio_tungstenite::tungstenite;

/// Errors from the control-channel client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("WebSocket error: {0}")]
    Ws(#[from] tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request timed out")]
    Timeout,

    #[error("not connected")]
    NotConnected,

    #[error("connection closed")]
    Closed,

    #[error("unexpected reply: {0:?}")]
    UnexpectedReply(MessageType),

    #[error("daemon error {code}: {message}")]
    Remote { code: i32, message: String },
}

impl From<ClientError> for DaemonError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Ws(e) => DaemonError::Unreachable(e.to_string()),
            ClientError::Json(e) => DaemonError::Protocol(e.to_string()),
            ClientError::Timeout => DaemonError::Timeout,
            ClientError::NotConnected | ClientError::Closed => DaemonError::Closed,
            ClientError::UnexpectedReply(t) => DaemonError::Protocol(format!("unexpected reply {t:?}")),
            ClientError::Remote { code, message } => DaemonError::Remote { code, message },
        }
    }
}
