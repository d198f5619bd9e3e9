//! Control-channel client for the storage daemon.
//!
//! [`WsDaemonClient`] speaks the JSON envelope protocol over a local
//! WebSocket. [`WsClientFactory`] hands fresh clients to the supervisor.

mod client;
mod error;

pub use client::{WsClientFactory, WsDaemonClient};
pub use error::ClientError;
