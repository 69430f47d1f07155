//! Global calindex configuration.

use std::path::{Path, PathBuf};

use ::config::{Config, File};
use serde::{Deserialize, Serialize};

use crate::error::{CalIndexError, CalIndexResult};

static DEFAULT_CALENDAR_FILE: &str = "~/.local/share/evolution/calendar/system/calendar.ics";

fn default_calendar_files() -> Vec<PathBuf> {
    vec![PathBuf::from(DEFAULT_CALENDAR_FILE)]
}

/// Configuration at ~/.config/calindex/config.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoreConfig {
    /// Calendar files to index, in load order.
    #[serde(default = "default_calendar_files")]
    pub calendar_files: Vec<PathBuf>,

    /// Where cached responses are kept. Defaults to the user cache directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_file: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            calendar_files: default_calendar_files(),
            cache_file: None,
        }
    }
}

impl StoreConfig {
    pub fn config_path() -> CalIndexResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CalIndexError::Config("Could not determine config directory".into()))?
            .join("calindex");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the user's config, writing a commented default file on first run.
    pub fn load() -> CalIndexResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> CalIndexResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .build()
            .map_err(|e| CalIndexError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| CalIndexError::Config(e.to_string()))
    }

    /// Calendar files with `~` expanded.
    pub fn calendar_paths(&self) -> Vec<PathBuf> {
        self.calendar_files.iter().map(|p| expand(p)).collect()
    }

    pub fn cache_path(&self) -> CalIndexResult<PathBuf> {
        if let Some(path) = &self.cache_file {
            return Ok(expand(path));
        }

        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| CalIndexError::Config("Could not determine cache directory".into()))?;
        Ok(cache_dir.join("calindex").join("responses.json"))
    }

    pub fn save_to(&self, path: &Path) -> CalIndexResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| CalIndexError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| CalIndexError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> CalIndexResult<()> {
        let contents = format!(
            "\
# calindex configuration

# Calendar files to index, in load order:
# calendar_files = [\"{}\"]

# Where cached command responses are stored:
# cache_file = \"~/.cache/calindex/responses.json\"
",
            DEFAULT_CALENDAR_FILE
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CalIndexError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| CalIndexError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
