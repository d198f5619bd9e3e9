//! Process-level collaborators for the supervisor.
//!
//! - [`ProcessLauncher`] spawns and boots an owned daemon child.
//! - [`PidFileManager`] stops a daemon some other process started.
//! - [`CommandMountSetup`] runs the configured mount setup command.

pub mod launcher;
pub mod manager;
pub mod mount;
pub mod pidfile;

pub use launcher::{LaunchOptions, OwnedProcess, ProcessLauncher};
pub use manager::PidFileManager;
pub use mount::CommandMountSetup;
