//! Launch-on-login via an XDG autostart entry.

use std::path::{Path, PathBuf};

/// An autostart desktop entry for the current user.
#[derive(Debug, Clone)]
pub struct LoginItem {
    entry: PathBuf,
    exec: PathBuf,
}

impl LoginItem {
    pub fn new(entry: PathBuf, exec: PathBuf) -> Self {
        Self { entry, exec }
    }

    /// The login item for this executable, or `None` where autostart
    /// entries are not supported.
    pub fn for_current_user() -> Option<Self> {
        if !cfg!(target_os = "linux") {
            return None;
        }
        let home = std::env::var_os("HOME")?;
        let config_home = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| Path::new(&home).join(".config"));
        let exec = std::env::current_exe().ok()?;
        Some(Self::new(
            config_home.join("autostart").join("hyperdaemon.desktop"),
            exec,
        ))
    }

    pub fn is_enabled(&self) -> bool {
        self.entry.exists()
    }

    pub fn set_enabled(&self, enabled: bool) -> std::io::Result<()> {
        if enabled {
            if let Some(parent) = self.entry.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&self.entry, self.desktop_entry())?;
        } else {
            match std::fs::remove_file(&self.entry) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        tracing::info!(enabled, entry = %self.entry.display(), "launch on login updated");
        Ok(())
    }

    /// Flips the setting and returns the new value.
    pub fn toggle(&self) -> std::io::Result<bool> {
        let enabled = !self.is_enabled();
        self.set_enabled(enabled)?;
        Ok(enabled)
    }

    fn desktop_entry(&self) -> String {
        format!(
            "[Desktop Entry]\n\
             Type=Application\n\
             Name=Hyper Daemon\n\
             Comment=Hyperdrive daemon tray controller\n\
             Exec=\"{}\"\n\
             Terminal=false\n\
             X-GNOME-Autostart-enabled=true\n",
            self.exec.display()
        )
    }
}
