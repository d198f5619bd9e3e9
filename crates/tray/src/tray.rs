//! Tray handle, events, and update types.
//!
//! The actual system tray depends on a platform GUI backend. This module
//! defines the channel-based interface the application uses to drive the
//! tray, independent of that backend.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Mutex, MutexGuard};

use hyperdaemon_supervisor::{Notifier, Presenter, StatusSnapshot};
use tracing::trace;

use crate::icon::{Theme, icon_path};
use crate::menu::{MenuAction, MenuItem, MenuState};

/// Configuration for the system tray.
#[derive(Debug, Clone)]
pub struct TrayConfig {
    /// Tooltip and notification title.
    pub title: String,
    pub version: String,
    pub theme: Theme,
    /// Root of the icon assets.
    pub assets_dir: PathBuf,
    /// Opened when a notification is clicked, if mount support is configured.
    pub drives_dir: Option<PathBuf>,
    pub mount_configured: bool,
    pub launch_on_login: bool,
}

impl Default for TrayConfig {
    fn default() -> Self {
        Self {
            title: "Hyper Daemon".into(),
            version: String::new(),
            theme: Theme::Auto,
            assets_dir: PathBuf::from("build"),
            drives_dir: None,
            mount_configured: false,
            launch_on_login: false,
        }
    }
}

/// Events emitted by the tray to the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayEvent {
    /// A menu item was clicked.
    Action(MenuAction),
    /// The desktop theme changed; the icon should be re-rendered.
    ThemeChanged,
}

/// A desktop notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub silent: bool,
    /// Folder to open when the notification is clicked.
    pub open_on_click: Option<PathBuf>,
}

/// Updates sent from the application to the tray.
#[derive(Debug, Clone)]
pub enum TrayUpdate {
    /// Replace the icon, tooltip and context menu.
    Render {
        icon: PathBuf,
        tooltip: String,
        items: Vec<MenuItem>,
    },
    /// Show a notification.
    Notify(Notification),
    /// Request tray shutdown.
    Shutdown,
}

/// Handle for communicating with the system tray.
///
/// Implements [`Presenter`] and [`Notifier`] so the supervisor can drive the
/// tray directly. Safe to share across threads.
pub struct TrayHandle {
    /// Send updates to the tray.
    update_tx: mpsc::Sender<TrayUpdate>,
    /// Receive events from the tray.
    event_rx: Mutex<mpsc::Receiver<TrayEvent>>,
    /// Current menu state.
    state: Mutex<MenuState>,
    title: String,
    theme: Theme,
    assets_dir: PathBuf,
    notify_click: Option<PathBuf>,
}

impl TrayHandle {
    /// Creates a new tray handle with its channel pair.
    ///
    /// Returns `(handle, event_sender, update_receiver)`; the sender/receiver
    /// pair is given to the tray backend.
    pub fn new(config: TrayConfig) -> (Self, mpsc::Sender<TrayEvent>, mpsc::Receiver<TrayUpdate>) {
        let (update_tx, update_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let notify_click = if config.mount_configured {
            config.drives_dir
        } else {
            None
        };

        let handle = Self {
            update_tx,
            event_rx: Mutex::new(event_rx),
            state: Mutex::new(MenuState {
                snapshot: StatusSnapshot::default(),
                mount_configured: config.mount_configured,
                launch_on_login: config.launch_on_login,
                version: config.version,
            }),
            title: config.title,
            theme: config.theme,
            assets_dir: config.assets_dir,
            notify_click,
        };

        (handle, event_tx, update_rx)
    }

    fn lock_state(&self) -> MutexGuard<'_, MenuState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Rebuilds the icon and menu from the current state and sends them.
    pub fn render(&self) {
        let (icon, items) = {
            let state = self.lock_state();
            (
                icon_path(&self.assets_dir, self.theme, state.snapshot.is_on()),
                state.build_menu(),
            )
        };
        let _ = self.update_tx.send(TrayUpdate::Render {
            icon,
            tooltip: self.title.clone(),
            items,
        });
    }

    /// Updates the launch-on-login checkbox.
    pub fn set_launch_on_login(&self, enabled: bool) {
        self.lock_state().launch_on_login = enabled;
        self.render();
    }

    /// Requests the tray to shut down.
    pub fn shutdown(&self) {
        let _ = self.update_tx.send(TrayUpdate::Shutdown);
    }

    /// Tries to receive a tray event (non-blocking).
    pub fn try_recv_event(&self) -> Option<TrayEvent> {
        self.event_rx
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .try_recv()
            .ok()
    }

    /// Returns the current menu state.
    pub fn state(&self) -> MenuState {
        self.lock_state().clone()
    }
}

impl Presenter for TrayHandle {
    fn refresh(&self, snapshot: &StatusSnapshot) {
        self.lock_state().snapshot = *snapshot;
        trace!(status = %snapshot.state, "tray refresh");
        self.render();
    }
}

impl Notifier for TrayHandle {
    fn notify(&self, message: &str) {
        let _ = self.update_tx.send(TrayUpdate::Notify(Notification {
            title: self.title.clone(),
            body: message.to_string(),
            silent: true,
            open_on_click: self.notify_click.clone(),
        }));
    }
}
