//! User configuration, read once at startup from the platform config dir.

use std::{fs, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Quiet period before an edit is committed to the preview.
    pub debounce_ms: u64,
    /// Watch the open file and reload on external changes.
    pub watch_files: bool,
    /// Replacement preview template; unset uses the bundled one.
    pub template_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            watch_files: true,
            template_path: None,
        }
    }
}

impl Config {
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// `config.toml` under the platform config dir, if one can be resolved.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("prismdown").join("config.toml"))
    }

    /// Load the user config. Missing files are normal; unreadable or
    /// malformed ones log a warning and fall back to defaults rather than
    /// blocking startup.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        let Ok(raw) = fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("ignoring malformed config {}: {err}", path.display());
                Self::default()
            }
        }
    }
}
