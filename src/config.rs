//! Configuration management for clipcap
//!
//! Provides configuration loading, saving, and validation for storage
//! naming, platform policy (permission thresholds), and recording options.

use crate::errors::CaptureError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipCapConfig {
    pub storage: StorageConfig,
    pub platform: PlatformConfig,
    pub recording: RecordingConfig,
}

/// Storage and clip-naming configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Namespace used in the relative media path (`Movies/<namespace>-Video`)
    pub app_namespace: String,
    /// Conventional media root the sink places clips under
    pub media_root: String,
}

impl StorageConfig {
    /// Relative path handed to the output sink for every new clip.
    pub fn relative_path(&self) -> String {
        format!("{}/{}-Video", self.media_root, self.app_namespace)
    }
}

/// Platform permission policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// API level of the host platform
    pub api_level: u32,
    /// Highest API level that still requires legacy external-storage write
    /// access before recording
    pub legacy_storage_max_level: u32,
}

/// Recording options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Capture an audio track when the microphone capability is granted
    pub audio_when_granted: bool,
}

impl Default for ClipCapConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig {
                app_namespace: "ClipCap".to_string(),
                media_root: "Movies".to_string(),
            },
            platform: PlatformConfig {
                api_level: 33,
                legacy_storage_max_level: 28,
            },
            recording: RecordingConfig {
                audio_when_granted: true,
            },
        }
    }
}

impl ClipCapConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, CaptureError> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| CaptureError::ConfigError(format!("Failed to read config file: {}", e)))?;

        let config: ClipCapConfig = toml::from_str(&contents)
            .map_err(|e| CaptureError::ConfigError(format!("Failed to parse config file: {}", e)))?;

        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CaptureError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CaptureError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| CaptureError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, toml_string)
            .map_err(|e| CaptureError::ConfigError(format!("Failed to write config file: {}", e)))?;

        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Get default config file path
    pub fn default_path() -> PathBuf {
        PathBuf::from("clipcap.toml")
    }

    /// Load from default location or create with defaults
    pub fn load_or_default() -> Self {
        Self::load_from_file(Self::default_path()).unwrap_or_else(|e| {
            log::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.storage.app_namespace.is_empty() {
            return Err("App namespace must not be empty".to_string());
        }
        if self.storage.media_root.is_empty() {
            return Err("Media root must not be empty".to_string());
        }
        if self
            .storage
            .app_namespace
            .chars()
            .any(|c| c == '/' || c == '\\')
        {
            return Err("App namespace must not contain path separators".to_string());
        }
        if self.platform.api_level == 0 {
            return Err("API level must be non-zero".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClipCapConfig::default();
        assert_eq!(config.storage.app_namespace, "ClipCap");
        assert_eq!(config.storage.relative_path(), "Movies/ClipCap-Video");
        assert_eq!(config.platform.legacy_storage_max_level, 28);
        assert!(config.recording.audio_when_granted);
    }

    #[test]
    fn test_config_validation() {
        let config = ClipCapConfig::default();
        assert!(config.validate().is_ok());

        let mut bad_config = config.clone();
        bad_config.storage.app_namespace = String::new();
        assert!(bad_config.validate().is_err());

        let mut bad_path = ClipCapConfig::default();
        bad_path.storage.app_namespace = "a/b".to_string();
        assert!(bad_path.validate().is_err());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("test_clipcap.toml");

        let mut config = ClipCapConfig::default();
        config.platform.api_level = 28;
        assert!(config.save_to_file(&config_path).is_ok());

        let loaded = ClipCapConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded.platform.api_level, 28);
        assert_eq!(loaded.storage.app_namespace, config.storage.app_namespace);
    }

    #[test]
    fn test_config_toml_format() {
        let config = ClipCapConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[storage]"));
        assert!(toml_string.contains("[platform]"));
        assert!(toml_string.contains("[recording]"));
        assert!(toml_string.contains("app_namespace"));
        assert!(toml_string.contains("legacy_storage_max_level"));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ClipCapConfig::load_from_file("nonexistent_file.toml");
        assert!(result.is_ok()); // Should return default
        assert_eq!(result.unwrap().storage.app_namespace, "ClipCap");
    }
}
