//! Menu action dispatch.

use std::path::PathBuf;
use std::sync::Arc;

use hyperdaemon_supervisor::{Notifier, Supervisor};
use hyperdaemon_tray::MenuAction;
use tracing::{info, warn};

use crate::login::LoginItem;
use crate::shell;

/// What the main loop should do after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Hook for flipping the launch-on-login checkbox in the tray.
pub trait LoginDisplay: Send + Sync {
    fn set_launch_on_login(&self, enabled: bool);
}

impl LoginDisplay for hyperdaemon_tray::TrayHandle {
    fn set_launch_on_login(&self, enabled: bool) {
        hyperdaemon_tray::TrayHandle::set_launch_on_login(self, enabled);
    }
}

/// Dispatches menu actions to the supervisor and the desktop.
pub struct Actions {
    pub supervisor: Arc<Supervisor>,
    pub notifier: Arc<dyn Notifier>,
    pub login_display: Arc<dyn LoginDisplay>,
    pub login: Option<LoginItem>,
    pub drives_dir: PathBuf,
    pub help_url: String,
}

impl Actions {
    pub async fn handle(&self, action: MenuAction) -> Flow {
        info!(?action, "menu action");
        match action {
            MenuAction::ToggleDaemon => {
                if let Err(e) = self.supervisor.toggle().await {
                    warn!(error = %e, "toggle failed");
                    self.notifier.notify(&e.to_string());
                }
            }
            MenuAction::SetupFuse => {
                if let Err(e) = self.supervisor.setup_mount_and_restart().await {
                    warn!(error = %e, "mount setup failed");
                    self.notifier.notify(&e.to_string());
                }
            }
            MenuAction::OpenDrives => self.open_drives().await,
            MenuAction::Help => self.show_help().await,
            MenuAction::ToggleLaunchOnLogin => self.toggle_login(),
            MenuAction::Quit => {
                self.supervisor.stop().await;
                return Flow::Quit;
            }
        }
        Flow::Continue
    }

    pub async fn open_drives(&self) {
        let target = self.drives_dir.to_string_lossy();
        if let Err(e) = shell::open(&target).await {
            warn!("failed to open drives: {e:#}");
        }
    }

    pub async fn show_help(&self) {
        if let Err(e) = shell::open(&self.help_url).await {
            warn!("failed to open help: {e:#}");
        }
    }

    fn toggle_login(&self) {
        let Some(login) = &self.login else {
            info!("launch on login is not supported on this platform");
            return;
        };
        match login.toggle() {
            Ok(enabled) => self.login_display.set_launch_on_login(enabled),
            Err(e) => warn!(error = %e, "failed to update launch on login"),
        }
    }
}
