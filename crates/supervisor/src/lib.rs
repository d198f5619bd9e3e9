//! Lifecycle supervisor for the storage daemon.
//!
//! The [`Supervisor`] decides whether to adopt a daemon that is already
//! serving or to spawn one of its own, keeps a single client connection to
//! whichever daemon is authoritative, and tears everything down again on
//! stop or on a termination signal. A [`poller`] re-validates liveness on a
//! fixed interval and is the only path that notices a daemon that died
//! out-of-band.
//!
//! Everything outside the state machine (the client transport, the child
//! process, the tray) is reached through the collaborator traits in
//! [`collab`].

pub mod collab;
pub mod error;
pub mod poller;
pub mod status;
pub mod supervisor;
pub mod types;

pub use collab::{
    BoxFuture, ClientFactory, Collaborators, DaemonClient, DaemonLauncher, DaemonManager,
    MountSetup, Notifier, OwnedDaemon, Presenter,
};
pub use error::{DaemonError, SupervisorError};
pub use poller::spawn_poller;
pub use status::StatusModel;
pub use supervisor::Supervisor;
pub use types::{CapabilityFlags, LifecycleState, StatusSnapshot};
