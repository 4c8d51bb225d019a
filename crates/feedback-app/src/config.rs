//! Configuration for the feedback form.
//!
//! Loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (`--config PATH`, or `config.toml` in the platform config dir)
//! 3. Built-in defaults (lowest priority)

use std::path::{Path, PathBuf};
use std::time::Duration;

use feedback_capture::{CaptureConfig, DEFAULT_CAPTURE_QUALITY, default_capture_dir};
use feedback_core::ImageFormat;
use feedback_upload::validate_api_base;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API base URL used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3333";

/// Env var overriding `api.base_url`.
pub const ENV_API_URL: &str = "FEEDBACK_API_URL";
/// Env var overriding `api.timeout_secs`.
pub const ENV_API_TIMEOUT_SECS: &str = "FEEDBACK_API_TIMEOUT_SECS";
/// Env var overriding `capture.dir`.
pub const ENV_CAPTURE_DIR: &str = "FEEDBACK_CAPTURE_DIR";

/// Backend API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL; feedback is posted to `{base_url}/feedbacks`.
    pub base_url: String,
    /// Request timeout. Unset waits indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: None,
        }
    }
}

/// Screenshot capture settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Raster format of captured files.
    pub format: ImageFormat,
    /// JPEG quality factor in `(0.0, 1.0]`.
    pub quality: f32,
    /// Directory captured files are written to.
    pub dir: Option<PathBuf>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpg,
            quality: DEFAULT_CAPTURE_QUALITY,
            dir: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend API settings.
    pub api: ApiConfig,
    /// Screenshot capture settings.
    pub capture: CaptureSettings,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads configuration: file -> env vars -> defaults, then validates it.
    ///
    /// An explicit `path` must exist. The default location is optional.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read or parsed, or a
    /// value fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file location.
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "feedback-form")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Reads and parses one TOML file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies environment overrides using `lookup` to read variables.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] when a timeout override is not a
    /// whole number of seconds.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api.base_url = url;
        }

        if let Some(raw) = lookup(ENV_API_TIMEOUT_SECS) {
            let seconds = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_API_TIMEOUT_SECS,
                message: format!("expected whole seconds, got {raw:?}"),
            })?;
            self.api.timeout_secs = Some(seconds);
        }

        if let Some(dir) = lookup(ENV_CAPTURE_DIR) {
            self.capture.dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    /// Checks the API URL and capture settings.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_api_base(&self.api.base_url).map_err(|error| ConfigError::InvalidValue {
            key: "api.base_url",
            message: error.to_string(),
        })?;

        if self.api.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "api.timeout_secs",
                message: "timeout must be greater than zero".to_string(),
            });
        }

        self.capture_config()?;
        Ok(())
    }

    /// Validated capture configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for an out-of-range quality.
    pub fn capture_config(&self) -> Result<CaptureConfig, ConfigError> {
        CaptureConfig::new(self.capture.format, self.capture.quality).map_err(|error| {
            ConfigError::InvalidValue {
                key: "capture.quality",
                message: error.to_string(),
            }
        })
    }

    /// Directory captured files are written to.
    pub fn capture_dir(&self) -> PathBuf {
        self.capture.dir.clone().unwrap_or_else(default_capture_dir)
    }

    /// HTTP request timeout, if configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.api.timeout_secs.map(Duration::from_secs)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but cannot be read.
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Config file is not valid TOML for [`AppConfig`].
    #[error("cannot parse config file {}: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },
    /// A value is out of range or malformed.
    #[error("invalid {key}: {message}")]
    InvalidValue {
        /// Config key or env var.
        key: &'static str,
        /// What is wrong with it.
        message: String,
    },
}
