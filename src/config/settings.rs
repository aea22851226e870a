//! Application settings file
//!
//! `config.json` under the platform config directory. Every field has a serde
//! default so partial files are fine; a missing or broken file falls back to
//! defaults with a warning.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::{config, inset, wkid};
use crate::geometry::SpatialReference;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inset container width in pixels
    #[serde(default = "default_inset_base_size")]
    pub inset_base_size: f64,

    /// Spatial reference assumed for maps that do not declare one usable
    #[serde(default = "default_wkid")]
    pub default_wkid: u32,

    /// Where configuration documents are kept (defaults under the config dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_dir: Option<PathBuf>,

    /// Where map items are looked up (defaults under the config dir)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_inset_base_size() -> f64 {
    inset::BASE_SIZE
}

fn default_wkid() -> u32 {
    wkid::WEB_MERCATOR
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            inset_base_size: default_inset_base_size(),
            default_wkid: default_wkid(),
            store_dir: None,
            map_dir: None,
        }
    }
}

impl AppSettings {
    fn app_dir() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(config::APP_DIR);
        path
    }

    pub fn config_path() -> PathBuf {
        Self::app_dir().join(config::FILENAME)
    }

    /// Load from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let mut settings = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<AppSettings>(&contents) {
                Ok(settings) => {
                    info!(path = %path.display(), "Loaded settings");
                    settings
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse settings, using defaults");
                    AppSettings::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppSettings::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read settings, using defaults");
                AppSettings::default()
            }
        };
        settings.validate_and_clamp();
        settings
    }

    /// Keep values inside usable ranges
    fn validate_and_clamp(&mut self) {
        if !self.inset_base_size.is_finite() {
            warn!(inset_base_size = self.inset_base_size, using = inset::BASE_SIZE, "inset_base_size is not a number, using default");
            self.inset_base_size = inset::BASE_SIZE;
        } else if self.inset_base_size < inset::MIN_BASE_SIZE {
            warn!(inset_base_size = self.inset_base_size, min = inset::MIN_BASE_SIZE, "inset_base_size below minimum, clamping");
            self.inset_base_size = inset::MIN_BASE_SIZE;
        } else if self.inset_base_size > inset::MAX_BASE_SIZE {
            warn!(inset_base_size = self.inset_base_size, max = inset::MAX_BASE_SIZE, "inset_base_size exceeds maximum, clamping");
            self.inset_base_size = inset::MAX_BASE_SIZE;
        }

        if self.default_wkid == 0 {
            warn!(using = wkid::WEB_MERCATOR, "default_wkid must be non-zero, using default");
            self.default_wkid = wkid::WEB_MERCATOR;
        }
    }

    pub fn default_spatial_reference(&self) -> SpatialReference {
        SpatialReference::new(self.default_wkid)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.store_dir
            .clone()
            .unwrap_or_else(|| Self::app_dir().join(config::STORE_SUBDIR))
    }

    pub fn map_dir(&self) -> PathBuf {
        self.map_dir
            .clone()
            .unwrap_or_else(|| Self::app_dir().join(config::MAPS_SUBDIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp(label: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "bookmark-insets-settings-{label}-{}.json",
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("bookmark-insets-settings-does-not-exist.json");
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let path = write_temp("partial", r#"{"log_level":"debug"}"#);
        let settings = AppSettings::load_from(&path);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.inset_base_size, inset::BASE_SIZE);
        assert_eq!(settings.default_wkid, wkid::WEB_MERCATOR);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let path = write_temp("clamp", r#"{"inset_base_size":5,"default_wkid":0}"#);
        let settings = AppSettings::load_from(&path);
        assert_eq!(settings.inset_base_size, inset::MIN_BASE_SIZE);
        assert_eq!(settings.default_wkid, wkid::WEB_MERCATOR);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_broken_file_uses_defaults() {
        let path = write_temp("broken", "{not json");
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_explicit_dirs_win() {
        let settings = AppSettings {
            store_dir: Some(PathBuf::from("/tmp/docs")),
            ..AppSettings::default()
        };
        assert_eq!(settings.store_dir(), PathBuf::from("/tmp/docs"));
        assert!(settings.map_dir().ends_with("bookmark-insets/maps"));
    }
}
