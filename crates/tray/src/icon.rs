//! Tray icon selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Icon theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the desktop (`GTK_THEME`).
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    /// Returns `true` when the dark icon set should be used.
    pub fn is_dark(self) -> bool {
        match self {
            Theme::Dark => true,
            Theme::Light => false,
            Theme::Auto => std::env::var("GTK_THEME")
                .map(|name| gtk_theme_is_dark(&name))
                .unwrap_or(false),
        }
    }
}

/// GTK theme names carry a `:dark` variant suffix or a `-dark` name suffix.
fn gtk_theme_is_dark(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.ends_with(":dark") || name.ends_with("-dark")
}

/// Icon file for the given theme and daemon state.
///
/// Layout: `<assets>/tray/<dark|light>/<enabled|disabled>@4x.png`.
pub fn icon_path(assets_dir: &Path, theme: Theme, enabled: bool) -> PathBuf {
    let folder = if theme.is_dark() { "dark" } else { "light" };
    let file = if enabled { "enabled" } else { "disabled" };
    assets_dir
        .join("tray")
        .join(folder)
        .join(format!("{file}@4x.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_themes() {
        let assets = Path::new("/usr/share/hyperdaemon");
        assert_eq!(
            icon_path(assets, Theme::Dark, true),
            Path::new("/usr/share/hyperdaemon/tray/dark/enabled@4x.png")
        );
        assert_eq!(
            icon_path(assets, Theme::Light, false),
            Path::new("/usr/share/hyperdaemon/tray/light/disabled@4x.png")
        );
    }

    #[test]
    fn gtk_theme_detection() {
        assert!(gtk_theme_is_dark("Adwaita:dark"));
        assert!(gtk_theme_is_dark("Arc-Dark"));
        assert!(!gtk_theme_is_dark("Adwaita"));
        assert!(!gtk_theme_is_dark("Darkish-Blue"));
    }

    #[test]
    fn theme_serde_names() {
        let theme: Theme = serde_json::from_str("\"dark\"").unwrap();
        assert_eq!(theme, Theme::Dark);
        assert_eq!(serde_json::to_string(&Theme::Auto).unwrap(), "\"auto\"");
    }
}
