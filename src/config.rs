use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::editor::EditorSettings;
use crate::error::StorageError;

/// Application configuration persisted to disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Maximum gap between two pointer-downs that counts as a double-click.
    #[serde(default = "default_double_click_ms")]
    pub double_click_ms: u64,

    /// Drawn rectangles must exceed this on both axes to become annotations.
    #[serde(default = "default_min_draw_size")]
    pub min_draw_size: f32,

    /// Per-axis pick radius for resize handles.
    #[serde(default = "default_handle_tolerance")]
    pub handle_tolerance: f32,

    /// Image list opened most recently.
    #[serde(default)]
    pub last_image_list: Option<PathBuf>,
}

fn default_double_click_ms() -> u64 {
    300
}

fn default_min_draw_size() -> f32 {
    5.0
}

fn default_handle_tolerance() -> f32 {
    crate::geometry::HANDLE_TOLERANCE
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            double_click_ms: default_double_click_ms(),
            min_draw_size: default_min_draw_size(),
            handle_tolerance: default_handle_tolerance(),
            last_image_list: None,
        }
    }
}

impl AppConfig {
    pub fn editor_settings(&self) -> EditorSettings {
        EditorSettings {
            double_click_secs: self.double_click_ms as f64 / 1000.0,
            min_draw_size: self.min_draw_size,
            handle_tolerance: self.handle_tolerance,
        }
    }

    pub fn read(path: &Path) -> Result<Self, StorageError> {
        let json = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn write(&self, path: &Path) -> Result<(), StorageError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| StorageError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| StorageError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the platform config location, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = crate::paths::config_file() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::read(&path) {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        let Some(path) = crate::paths::config_file() else {
            return;
        };
        if let Err(e) = self.write(&path) {
            warn!("Failed to save config: {}", e);
        }
    }
}
