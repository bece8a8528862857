//! Designer configuration storage
//!
//! Holds the app name used in exported filenames, the auto-save key and
//! location, and the layout constants. Stored as `config.json` in the
//! designer's data directory; every field falls back to its default when
//! missing, so old or hand-written files keep loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::geometry::Footprint;
use crate::persistence::{FilePersistence, AUTOSAVE_KEY};
use crate::templates::GridLayout;

/// Default application name
pub const APP_NAME: &str = "mammoth";

/// Default number of undo snapshots kept
pub const UNDO_DEPTH: usize = 100;

const CONFIG_FILE: &str = "config.json";

/// Full designer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignerConfig {
    /// Prefix of exported workflow filenames
    pub app_name: String,
    /// Key the auto-saved graph is stored under
    pub autosave_key: String,
    /// Directory for auto-save files; platform data dir when unset
    pub storage_dir: Option<PathBuf>,
    /// Maximum number of undo snapshots
    pub undo_depth: usize,
    /// Node bounding box used for edge geometry
    pub footprint: Footprint,
    /// Grid used when expanding templates
    pub layout: GridLayout,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            autosave_key: AUTOSAVE_KEY.to_string(),
            storage_dir: None,
            undo_depth: UNDO_DEPTH,
            footprint: Footprint::default(),
            layout: GridLayout::default(),
        }
    }
}

impl DesignerConfig {
    /// Load configuration from `<dir>/config.json`
    ///
    /// A missing file yields the defaults.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config_path = dir.as_ref().join(CONFIG_FILE);

        if !config_path.exists() {
            log::debug!("No config at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;
        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration to `<dir>/config.json`
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<(), ConfigError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let config_path = dir.join(CONFIG_FILE);
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(&config_path, contents)?;

        log::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Directory auto-save files live in
    pub fn storage_dir(&self) -> PathBuf {
        match &self.storage_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir(),
        }
    }

    /// File-backed auto-save storage at the configured location
    pub fn persistence(&self) -> FilePersistence {
        FilePersistence::new(self.storage_dir(), self.autosave_key.clone())
    }
}

/// Platform data directory for the designer, `./.mammoth` when unknown
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_NAME)))
}

/// Platform config directory for the designer, `./.mammoth` when unknown
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from(format!(".{}", APP_NAME)))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}
