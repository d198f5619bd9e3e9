//! Small persisted application state.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// State that survives restarts, stored next to the configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    /// The usage help has been opened once.
    #[serde(default)]
    pub help_displayed: bool,
}

impl State {
    /// Reads the state file. A missing file yields the default state.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::debug!(path = %path.display(), "state saved");
        Ok(())
    }
}
