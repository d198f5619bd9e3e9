//! Wire protocol for the daemon control channel.
//!
//! The tray talks to the storage daemon over a local WebSocket. Every frame
//! is a JSON [`Message`] envelope correlated by `id`.

pub mod constants;
pub mod envelope;
pub mod messages;

// Re-export primary types for convenience.
pub use constants::MessageType;
pub use envelope::{Message, RemoteError};
pub use messages::DaemonStatus;
