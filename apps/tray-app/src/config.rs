//! Application configuration management.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/hyperdaemon/config.toml`
//! - Windows: `%APPDATA%/hyperdaemon/config.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use hyperdaemon_protocol::constants::DEFAULT_DAEMON_URL;
use hyperdaemon_tray::Theme;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Control endpoint of the daemon.
    #[serde(default = "default_daemon_url")]
    pub daemon_url: String,

    /// Daemon executable spawned when no daemon is running.
    #[serde(default = "default_daemon_program")]
    pub daemon_program: String,

    /// Extra arguments for the daemon executable.
    #[serde(default)]
    pub daemon_args: Vec<String>,

    /// Storage directory handed to an owned daemon.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// Pid file written by a daemon started elsewhere.
    #[serde(default = "default_pid_file")]
    pub pid_file: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_boot_timeout_secs")]
    pub boot_timeout_secs: u64,

    #[serde(default = "default_stop_grace_secs")]
    pub stop_grace_secs: u64,

    /// Mount setup command line. Mount support is enabled only when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuse_setup_command: Option<String>,

    /// Folder where mounted drives appear.
    #[serde(default = "default_drives_dir")]
    pub drives_dir: String,

    #[serde(default = "default_help_url")]
    pub help_url: String,

    #[serde(default)]
    pub theme: Theme,

    /// Root of the tray icon assets.
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,

    /// Refuse to start while another instance holds the lock.
    #[serde(default = "default_true")]
    pub single_instance: bool,
}

fn default_daemon_url() -> String {
    DEFAULT_DAEMON_URL.into()
}

fn default_daemon_program() -> String {
    "hyperdrive-daemon".into()
}

fn default_storage_dir() -> String {
    "~/.hyperdrive/storage".into()
}

fn default_pid_file() -> String {
    "~/.hyperdrive/daemon.pid".into()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_boot_timeout_secs() -> u64 {
    30
}

fn default_stop_grace_secs() -> u64 {
    10
}

fn default_drives_dir() -> String {
    "~/Hyperdrive".into()
}

fn default_help_url() -> String {
    "https://github.com/libscie/hyperdaemon/blob/main/README.md#usage".into()
}

fn default_assets_dir() -> String {
    "/usr/share/hyperdaemon".into()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon_url: default_daemon_url(),
            daemon_program: default_daemon_program(),
            daemon_args: Vec::new(),
            storage_dir: default_storage_dir(),
            pid_file: default_pid_file(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            boot_timeout_secs: default_boot_timeout_secs(),
            stop_grace_secs: default_stop_grace_secs(),
            fuse_setup_command: None,
            drives_dir: default_drives_dir(),
            help_url: default_help_url(),
            theme: Theme::Auto,
            assets_dir: default_assets_dir(),
            single_instance: default_true(),
        }
    }
}

impl Config {
    /// Loads configuration from disk, or creates a default if not found.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_dir().join("config.toml"))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Saves the configuration to `path`.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // Restrict permissions on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn boot_timeout(&self) -> Duration {
        Duration::from_secs(self.boot_timeout_secs)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs(self.stop_grace_secs)
    }

    pub fn storage_dir(&self) -> PathBuf {
        expand_home(&self.storage_dir)
    }

    pub fn pid_file(&self) -> PathBuf {
        expand_home(&self.pid_file)
    }

    pub fn drives_dir(&self) -> PathBuf {
        expand_home(&self.drives_dir)
    }

    pub fn assets_dir(&self) -> PathBuf {
        expand_home(&self.assets_dir)
    }
}

fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| "/tmp".into()))
}

/// Expands a leading `~` against `HOME`.
pub fn expand_home(path: &str) -> PathBuf {
    expand_with(path, &home_dir())
}

fn expand_with(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Returns the platform-specific configuration directory.
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("hyperdaemon")
    }

    #[cfg(not(target_os = "windows"))]
    {
        home_dir().join(".config").join("hyperdaemon")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.daemon_url, "ws://127.0.0.1:49737");
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.boot_timeout(), Duration::from_secs(30));
        assert_eq!(config.stop_grace(), Duration::from_secs(10));
        assert!(config.fuse_setup_command.is_none());
        assert!(config.single_instance);
        assert_eq!(config.theme, Theme::Auto);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = Config {
            daemon_args: vec!["--log-level".into(), "debug".into()],
            fuse_setup_command: Some("hyperdrive fuse-setup".into()),
            theme: Theme::Dark,
            poll_interval_ms: 250,
            ..Config::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn config_partial_toml() {
        // Only specify a couple of fields, rest should use defaults.
        let toml_str = r#"
            daemon_url = "ws://127.0.0.1:9000"
            theme = "light"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.daemon_url, "ws://127.0.0.1:9000");
        assert_eq!(config.theme, Theme::Light);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.drives_dir, "~/Hyperdrive");
    }

    #[test]
    fn load_creates_default_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn load_reads_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "stop_grace_secs = 3\nsingle_instance = false\n").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.stop_grace(), Duration::from_secs(3));
        assert!(!config.single_instance);
    }

    #[test]
    fn home_expansion() {
        let home = Path::new("/home/ada");
        assert_eq!(expand_with("~", home), PathBuf::from("/home/ada"));
        assert_eq!(
            expand_with("~/Hyperdrive", home),
            PathBuf::from("/home/ada/Hyperdrive")
        );
        assert_eq!(expand_with("/srv/drives", home), PathBuf::from("/srv/drives"));
        assert_eq!(expand_with("~other/x", home), PathBuf::from("~other/x"));
    }

    #[test]
    fn config_dir_not_empty() {
        assert!(config_dir().to_string_lossy().contains("hyperdaemon"));
    }
}
