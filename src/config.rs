//! Persisted operator settings.
//!
//! Settings are stored as TOML:
//!
//! ```toml
//! last_input_path = "/home/me/Descargas"
//! auto_open = false
//! use_date_folder = true
//! base_dir = "/home/me/Google Drive"
//! archive_folder = "Archivos"
//! seven_zip_command = "7z"
//! settle_delay_ms = 500
//! ```
//!
//! Every key is optional. The organizer only ever sees the destination root
//! derived from `base_dir` and `archive_folder`, and the date-folder flag.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".hemerotecarc.toml";

/// Errors that can occur while loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(#[from] toml::de::Error),

    #[error("Could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// IO error while reading or writing configuration.
    #[error("IO error on configuration file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Operator settings shared between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Input folder used last, offered again when none is given.
    pub last_input_path: Option<PathBuf>,
    /// Open the destination folder after organizing.
    pub auto_open: bool,
    /// Add a date folder below the diary folder.
    pub use_date_folder: bool,
    /// Folder containing the archive tree, usually a synced-storage root.
    /// Defaults to the home directory.
    pub base_dir: Option<PathBuf>,
    /// Name of the archive tree inside `base_dir`.
    pub archive_folder: String,
    /// Program used for `.rar` and `.7z` archives.
    pub seven_zip_command: String,
    /// Pause after each extraction, in milliseconds.
    pub settle_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_input_path: None,
            auto_open: false,
            use_date_folder: false,
            base_dir: None,
            archive_folder: "Archivos".to_string(),
            seven_zip_command: "7z".to_string(),
            settle_delay_ms: 500,
        }
    }
}

impl Settings {
    /// Load settings, with fallback to defaults.
    ///
    /// Attempts to load settings in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.hemerotecarc.toml` in the current directory
    /// 3. Look for `~/.config/hemeroteca/config.toml` in the home directory
    /// 4. Fall back to default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a file is explicitly provided but cannot be read,
    /// or if any file found is not valid TOML.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::load_with_source(config_path)?.0)
    }

    /// Like [`load`](Self::load), also returning the file the settings came
    /// from, if any.
    pub fn load_with_source(
        config_path: Option<&Path>,
    ) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = config_path {
            return Ok((Self::load_from_file(path)?, Some(path.to_path_buf())));
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Ok((Self::load_from_file(&local_config)?, Some(local_config)));
        }

        if let Some(home_config) = Self::user_config_path()
            && home_config.exists()
        {
            return Ok((Self::load_from_file(&home_config)?, Some(home_config)));
        }

        Ok((Self::default(), None))
    }

    /// `~/.config/hemeroteca/config.toml`, when a home directory is known.
    pub fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|home| home.join(".config").join("hemeroteca").join("config.toml"))
    }

    /// Load settings from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if the file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::Io` if the file cannot be read.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(toml::from_str(&content)?)
    }

    /// Writes the settings to `path` as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(io_error)
    }

    /// The root of the archive tree: `base_dir/archive_folder`.
    ///
    /// Falls back to the home directory, then the current directory, when no
    /// `base_dir` is configured.
    pub fn destination_root(&self) -> PathBuf {
        let base = self
            .base_dir
            .clone()
            .or_else(home_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(&self.archive_folder)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(!settings.use_date_folder);
        assert_eq!(settings.archive_folder, "Archivos");
        assert_eq!(settings.settle_delay(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_file_uses_defaults_for_missing_keys() {
        let settings: Settings = toml::from_str("use_date_folder = true").unwrap();
        assert!(settings.use_date_folder);
        assert_eq!(settings.seven_zip_command, "7z");
        assert_eq!(settings.last_input_path, None);
    }

    #[test]
    fn test_destination_root_from_base_dir() {
        let settings = Settings {
            base_dir: Some(PathBuf::from("/drive")),
            ..Default::default()
        };
        assert_eq!(settings.destination_root(), PathBuf::from("/drive/Archivos"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("nested").join("config.toml");
        let settings = Settings {
            last_input_path: Some(PathBuf::from("/scans/in")),
            auto_open: true,
            use_date_folder: true,
            ..Default::default()
        };

        settings.save(&path).expect("Failed to save settings");
        let loaded = Settings::load(Some(&path)).expect("Failed to load settings");

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = Settings::load(Some(Path::new("/no/such/config.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "use_date_folder = \"maybe\"").unwrap();

        let result = Settings::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }
}
