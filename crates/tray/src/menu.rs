//! Dynamic context menu for the system tray.

use std::str::FromStr;

use hyperdaemon_supervisor::{LifecycleState, StatusSnapshot};

/// Actions that can be triggered from the tray context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    /// Turn the daemon on or off.
    ToggleDaemon,
    /// Open the mounted drives folder.
    OpenDrives,
    /// Run the mount setup step and restart the daemon.
    SetupFuse,
    /// Flip the launch-on-login setting.
    ToggleLaunchOnLogin,
    /// Open the usage documentation.
    Help,
    /// User requested to quit the application.
    Quit,
}

impl FromStr for MenuAction {
    type Err = String;

    /// Parses the short command names used by text frontends.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "toggle" => Ok(Self::ToggleDaemon),
            "drives" | "open-drives" => Ok(Self::OpenDrives),
            "setup-fuse" | "fuse" => Ok(Self::SetupFuse),
            "login" => Ok(Self::ToggleLaunchOnLogin),
            "help" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// A single menu item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Display text. Empty for separators.
    pub label: String,
    /// Whether the item is enabled (clickable).
    pub enabled: bool,
    /// `Some` for checkbox items.
    pub checked: Option<bool>,
    /// Optional action triggered on click.
    pub action: Option<MenuAction>,
}

impl MenuItem {
    fn info(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: false,
            checked: None,
            action: None,
        }
    }

    fn action(label: impl Into<String>, action: MenuAction) -> Self {
        Self {
            label: label.into(),
            enabled: true,
            checked: None,
            action: Some(action),
        }
    }

    /// Separator (represented as disabled empty item).
    fn separator() -> Self {
        Self::info(String::new())
    }

    pub fn is_separator(&self) -> bool {
        self.label.is_empty() && self.action.is_none()
    }
}

/// Current state used to build the context menu.
#[derive(Debug, Clone, Default)]
pub struct MenuState {
    pub snapshot: StatusSnapshot,
    /// Whether a mount setup step was configured at startup.
    pub mount_configured: bool,
    pub launch_on_login: bool,
    /// Application version shown in the menu.
    pub version: String,
}

impl MenuState {
    /// Builds the menu items from the current state.
    pub fn build_menu(&self) -> Vec<MenuItem> {
        let state = self.snapshot.state;
        let mut items = vec![MenuItem::info(format!(
            "Hyper Daemon: {}",
            capitalize(state.as_str())
        ))];

        if state == LifecycleState::On {
            items.push(MenuItem::action("Turn Daemon Off", MenuAction::ToggleDaemon));

            items.push(MenuItem::separator());
            let flags = self.snapshot.flags;
            items.push(MenuItem::info(if flags.holepunchable {
                "Holepunching is enabled"
            } else {
                "Holepunching is disabled"
            }));
            if flags.fuse_enabled {
                items.push(MenuItem::info("FUSE is enabled"));
                items.push(MenuItem::action("Open Drives", MenuAction::OpenDrives));
            } else if self.mount_configured {
                items.push(MenuItem::action("Setup FUSE", MenuAction::SetupFuse));
            } else {
                items.push(MenuItem::info("FUSE is unavailable"));
            }
        } else {
            items.push(MenuItem::action("Turn Daemon On", MenuAction::ToggleDaemon));
        }

        items.push(MenuItem::separator());
        items.push(MenuItem {
            checked: Some(self.launch_on_login),
            ..MenuItem::action("Launch on Login", MenuAction::ToggleLaunchOnLogin)
        });

        items.push(MenuItem::separator());
        items.push(MenuItem::info(format!("Version {}", self.version)));
        items.push(MenuItem::action("Help", MenuAction::Help));

        items.push(MenuItem::separator());
        items.push(MenuItem::action("Quit", MenuAction::Quit));

        items
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
