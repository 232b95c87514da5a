//! The [`BridgeConfig`] struct and its persistence.
//!
//! Covers:
//! - `load` / `load_from` / `save_to` (YAML file I/O with atomic write)
//! - XDG-style path helpers (`config_path`, `config_dir`)
//! - Field validation
//! - Runtime resolution of the `wish` executable

use crate::error::ConfigError;
use crate::types::LogLevel;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for connecting to a waveform viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BridgeConfig {
    /// Tcl/Tk shell used to reach the viewer's interpreter (default: "wish")
    #[serde(default = "crate::defaults::wish_path")]
    pub wish_path: String,

    /// Tk application name registered by the bridge
    #[serde(default = "crate::defaults::app_class")]
    pub app_class: String,

    /// Substrings identifying viewer interpreters during discovery
    #[serde(default = "crate::defaults::viewer_identifiers")]
    pub viewer_identifiers: Vec<String>,

    /// Preferred viewer interpreter name. When unset the caller picks one
    /// of the discovered candidates.
    #[serde(default)]
    pub target: Option<String>,

    /// Local command name the viewer invokes on cursor time changes
    #[serde(default = "crate::defaults::callback_command")]
    pub callback_command: String,

    /// Ask the viewer to deliver event callbacks asynchronously
    #[serde(default = "crate::defaults::bool_true")]
    pub asynchronous_callbacks: bool,

    /// Options passed to `wvSetSearchMode` before a signal-change search
    #[serde(default = "crate::defaults::search_options")]
    pub search_options: Vec<String>,

    /// Debug log verbosity
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            wish_path: crate::defaults::wish_path(),
            app_class: crate::defaults::app_class(),
            viewer_identifiers: crate::defaults::viewer_identifiers(),
            target: None,
            callback_command: crate::defaults::callback_command(),
            asynchronous_callbacks: true,
            search_options: crate::defaults::search_options(),
            log_level: LogLevel::default(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from the default path, or defaults if it doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            log::info!(
                "Config file not found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific YAML file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let config: BridgeConfig = serde_yaml_ng::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml).map_err(|e| ConfigError::io(&temp_path, e))?;
        fs::rename(&temp_path, path).map_err(|e| ConfigError::io(path, e))?;
        Ok(())
    }

    /// Check field values that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wish_path.trim().is_empty() {
            return Err(ConfigError::Validation("wish_path must not be empty".into()));
        }
        if self.app_class.trim().is_empty() {
            return Err(ConfigError::Validation("app_class must not be empty".into()));
        }
        if self.callback_command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "callback_command must not be empty".into(),
            ));
        }
        if self.viewer_identifiers.iter().all(|id| id.is_empty()) {
            return Err(ConfigError::Validation(
                "viewer_identifiers needs at least one non-empty entry".into(),
            ));
        }
        Ok(())
    }

    /// Get the configuration file path (XDG convention)
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Get the configuration directory path (XDG convention)
    pub fn config_dir() -> PathBuf {
        #[cfg(target_os = "windows")]
        {
            if let Some(config_dir) = dirs::config_dir() {
                config_dir.join("wave-bridge")
            } else {
                PathBuf::from(".")
            }
        }
        #[cfg(not(target_os = "windows"))]
        {
            if let Some(home_dir) = dirs::home_dir() {
                home_dir.join(".config").join("wave-bridge")
            } else {
                PathBuf::from(".")
            }
        }
    }

    /// Resolve the wish executable path at runtime.
    ///
    /// An absolute configured path that exists is used directly. The default
    /// "wish" is searched on PATH and in common install locations; anything
    /// else is returned unchanged for the OS to resolve.
    pub fn resolve_wish_path(&self) -> String {
        let configured = &self.wish_path;

        if Path::new(configured).is_absolute() && Path::new(configured).exists() {
            return configured.clone();
        }

        if configured != "wish" {
            return configured.clone();
        }

        if let Ok(path_env) = std::env::var("PATH") {
            for dir in std::env::split_paths(&path_env) {
                let candidate = dir.join("wish");
                if candidate.exists() {
                    return candidate.to_string_lossy().to_string();
                }
            }
        }

        // Distros often ship only a versioned binary
        let fallback_paths = [
            "/usr/bin/wish8.6",
            "/usr/local/bin/wish8.6",
            "/usr/bin/wish9.0",
            "/opt/homebrew/bin/wish",
        ];
        for path in fallback_paths {
            if Path::new(path).exists() {
                return path.to_string();
            }
        }

        configured.clone()
    }
}
