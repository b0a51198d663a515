//! Platform-appropriate locations for the config file and category list.
//!
//! - Linux: `~/.config/image-labeler/` (config), `~/.local/share/image-labeler/` (data)
//! - Windows/macOS: both live in the platform data directory

use std::path::PathBuf;

const APP_DIR: &str = "image-labeler";

pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        dirs::config_dir().map(|p| p.join(APP_DIR))
    }

    #[cfg(not(target_os = "linux"))]
    {
        data_dir()
    }
}

pub fn data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join(APP_DIR))
}

pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.json"))
}

pub fn categories_file() -> Option<PathBuf> {
    data_dir().map(|d| d.join("categories.json"))
}
