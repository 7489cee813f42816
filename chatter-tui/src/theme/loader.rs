use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::ThemeManager;

const PREFERENCE_FILE: &str = "theme.toml";

/// Contents of the remembered-theme file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemePreference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// Remembers the theme picked with Ctrl+T between runs.
pub struct ThemeLoader {
    path: PathBuf,
}

impl ThemeLoader {
    pub fn new() -> Self {
        let dir = chatter_core::get_config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_path(dir.join(PREFERENCE_FILE))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty preference, not an error.
    pub fn read(&self) -> Result<ThemePreference> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => toml::from_str(&raw)
                .with_context(|| format!("Malformed theme preference {:?}", self.path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ThemePreference::default()),
            Err(e) => Err(e).with_context(|| format!("Cannot read {:?}", self.path)),
        }
    }

    pub fn save_theme_name(&self, name: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).with_context(|| format!("Cannot create {:?}", dir))?;
        }
        let preference = ThemePreference {
            theme: Some(name.to_string()),
        };
        let raw = toml::to_string(&preference).context("Cannot encode theme preference")?;
        fs::write(&self.path, raw).with_context(|| format!("Cannot write {:?}", self.path))?;
        debug!(theme = name, path = ?self.path, "Theme preference saved");
        Ok(())
    }

    /// The saved theme name, if there is a readable one.
    pub fn remembered(&self) -> Option<String> {
        match self.read() {
            Ok(preference) => preference.theme,
            Err(e) => {
                warn!("Ignoring theme preference: {:#}", e);
                None
            }
        }
    }

    /// Pick the first known theme out of `preferred` (from the main config)
    /// and the remembered one, else stay on the built-in default.
    pub fn initialize_theme_manager(&self, preferred: Option<&str>) -> ThemeManager {
        let mut manager = ThemeManager::new();
        let candidates = preferred.map(str::to_string).into_iter().chain(self.remembered());

        for name in candidates {
            if manager.set_theme_by_name(&name) {
                return manager;
            }
            warn!(theme = %name, "Unknown theme, skipping");
        }
        manager
    }
}

impl Default for ThemeLoader {
    fn default() -> Self {
        Self::new()
    }
}
