//! Error types for the supervisor and its collaborators.

use std::time::Duration;

/// Errors reported by daemon collaborators (client, process, manager, mount setup).
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("daemon unreachable: {0}")]
    Unreachable(String),

    #[error("request timed out")]
    Timeout,

    #[error("connection closed")]
    Closed,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("daemon error {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("failed to spawn daemon: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("daemon exited during boot: {0}")]
    Exited(String),

    #[error("daemon not ready after {0:?}")]
    BootTimeout(Duration),

    #[error("daemon not running: {0}")]
    NotRunning(String),

    #[error("{0}")]
    Command(String),

    #[error("not supported on this platform: {0}")]
    Unsupported(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced to callers of the supervisor.
///
/// Only boot and mount-setup failures are user-visible; probe and cleanup
/// failures are absorbed inside the supervisor.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("daemon failed to start: {0}")]
    Boot(#[source] DaemonError),

    #[error("{0}")]
    MountSetup(#[source] DaemonError),

    #[error("mount setup is not available")]
    MountUnavailable,
}
