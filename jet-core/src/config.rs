use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;
use crate::repository::OWNER_USERNAME;

const APP_DIR: &str = "jetsamples";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Username whose posts appear under "My posts".
    pub owner: String,
    /// Overrides where `posts.json` and `preferences.json` live.
    pub data_dir: Option<PathBuf>,
    pub log_filter: String,
    pub window: WindowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            owner: OWNER_USERNAME.to_string(),
            data_dir: None,
            log_filter: "info".to_string(),
            window: WindowConfig::default(),
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 720.0,
            height: 800.0,
        }
    }
}

impl AppConfig {
    /// `<config dir>/jetsamples`, created if missing.
    pub fn config_dir() -> Result<PathBuf, StoreError> {
        let config_dir = dirs::config_dir().ok_or(StoreError::ConfigDirUnavailable)?;
        let app_config_dir = config_dir.join(APP_DIR);
        std::fs::create_dir_all(&app_config_dir)?;
        Ok(app_config_dir)
    }

    pub fn config_file_path() -> Result<PathBuf, StoreError> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Loads the user's configuration, falling back to (and saving) defaults.
    pub fn load() -> Self {
        match Self::config_file_path().and_then(|path| Self::load_from_file(&path)) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "failed to load configuration, using defaults");
                let default_config = Self::default();
                if let Err(save_err) = default_config.save() {
                    warn!(error = %save_err, "failed to save default configuration");
                }
                default_config
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        self.save_to_file(&Self::config_file_path()?)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Directory holding the post and preference stores.
    pub fn resolve_data_dir(&self) -> Result<PathBuf, StoreError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::config_dir(),
        }
    }
}
