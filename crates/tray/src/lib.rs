//! Tray presentation for the Hyper Daemon controller.
//!
//! The menu and icon are rebuilt from the supervisor's status snapshot on
//! every change. The tray communicates with the application via channels:
//! - [`TrayEvent`]: events from the tray to the app (menu clicks)
//! - [`TrayUpdate`]: updates from the app to the tray (new menu, notifications)
//!
//! # Platform notes
//! - The GUI backend owns the other end of both channels and may run on the
//!   main thread; [`TrayHandle`] itself is thread-safe.

mod icon;
mod menu;
mod tray;

pub use icon::{Theme, icon_path};
pub use menu::{MenuAction, MenuItem, MenuState};
pub use tray::{Notification, TrayConfig, TrayEvent, TrayHandle, TrayUpdate};
