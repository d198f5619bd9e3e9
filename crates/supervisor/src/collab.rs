//! Collaborator traits the supervisor drives.
//!
//! Implementors live in other crates (the WebSocket client, the child
//! process launcher, the tray). Methods return boxed futures so the
//! supervisor can hold every collaborator as a trait object.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hyperdaemon_protocol::DaemonStatus;

use crate::error::DaemonError;
use crate::types::StatusSnapshot;

/// A boxed future returned by collaborator methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A connection to a daemon, owned or foreign.
pub trait DaemonClient: Send + Sync {
    /// Opens the connection and waits until the daemon answers.
    fn ready(&self) -> BoxFuture<'_, Result<(), DaemonError>>;

    /// Fetches the daemon's status report.
    fn status(&self) -> BoxFuture<'_, Result<DaemonStatus, DaemonError>>;

    /// Closes the connection. Never fails; a dead connection is already closed.
    fn close(&self) -> BoxFuture<'_, ()>;
}

/// Creates fresh, not yet connected clients.
pub trait ClientFactory: Send + Sync {
    fn create(&self) -> Box<dyn DaemonClient>;
}

/// A daemon instance this process spawned and owns.
pub trait OwnedDaemon: Send + Sync {
    /// Stops the instance and waits for it to exit.
    fn stop(&mut self) -> BoxFuture<'_, Result<(), DaemonError>>;

    /// Returns `true` once the process has exited on its own or been stopped.
    fn has_exited(&mut self) -> bool;
}

/// Spawns owned daemon instances.
pub trait DaemonLauncher: Send + Sync {
    /// Starts a daemon and resolves once it has finished booting.
    fn launch(&self) -> BoxFuture<'_, Result<Box<dyn OwnedDaemon>, DaemonError>>;
}

/// Controls a daemon started by some other process.
pub trait DaemonManager: Send + Sync {
    /// Asks the foreign daemon to terminate.
    fn stop(&self) -> BoxFuture<'_, Result<(), DaemonError>>;
}

/// Platform-specific filesystem mount setup.
pub trait MountSetup: Send + Sync {
    fn run(&self) -> BoxFuture<'_, Result<(), DaemonError>>;
}

/// Presentation refresh hook, called after every state change.
pub trait Presenter: Send + Sync {
    fn refresh(&self, snapshot: &StatusSnapshot);
}

/// User-visible notification side channel.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Everything the supervisor needs from the outside world.
#[derive(Clone)]
pub struct Collaborators {
    pub clients: Arc<dyn ClientFactory>,
    pub launcher: Arc<dyn DaemonLauncher>,
    pub manager: Arc<dyn DaemonManager>,
    pub presenter: Arc<dyn Presenter>,
    pub notifier: Arc<dyn Notifier>,
    /// `None` when mount support was not configured at startup.
    pub mount_setup: Option<Arc<dyn MountSetup>>,
}
