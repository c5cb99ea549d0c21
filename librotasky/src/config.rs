//! Configuration management for Rotasky
//!
//! File paths come from an optional TOML config file; the Bluesky
//! credentials come only from the environment so they never end up in a
//! file that gets committed next to the post data.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};

pub const HANDLE_ENV: &str = "BLUESKY_HANDLE";
pub const PASSWORD_ENV: &str = "BLUESKY_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON document holding the date-anchored posts
    pub scheduled_posts: String,
    /// Plain text file, one rotation post per line
    pub pool: String,
    /// JSON document tracking recently used rotation posts
    pub state: String,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// `ROTASKY_CONFIG` overrides the path; otherwise the XDG config
    /// directory is tried, and a missing file falls back to the built-in
    /// defaults (paths relative to the working directory, which is what a
    /// checked-out scheduler job wants).
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("ROTASKY_CONFIG") {
            let path = PathBuf::from(shellexpand::tilde(&path).to_string());
            return Self::load_from_path(&path);
        }

        let config_path = default_config_path()?;
        if config_path.exists() {
            Self::load_from_path(&config_path)
        } else {
            Ok(Self::default_config())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// The built-in default configuration
    pub fn default_config() -> Self {
        Self {
            storage: StorageConfig {
                scheduled_posts: "scheduled_posts.json".to_string(),
                pool: "posts.txt".to_string(),
                state: "bot_state.json".to_string(),
            },
        }
    }
}

impl StorageConfig {
    /// Expand `~` in each configured path
    pub fn expanded(&self) -> (PathBuf, PathBuf, PathBuf) {
        (
            PathBuf::from(shellexpand::tilde(&self.scheduled_posts).to_string()),
            PathBuf::from(shellexpand::tilde(&self.pool).to_string()),
            PathBuf::from(shellexpand::tilde(&self.state).to_string()),
        )
    }
}

/// Resolve the configuration file path following the XDG Base Directory spec
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("rotasky").join("config.toml"))
}

/// Bluesky account credentials
///
/// The app password is wrapped so it is not printed by accident; callers go
/// through [`secrecy::ExposeSecret`] at the single point where the login
/// call needs the raw string.
pub struct Credentials {
    pub handle: String,
    pub app_password: SecretString,
}

impl Credentials {
    /// Read credentials from the environment.
    ///
    /// This is the first thing a run does; a missing variable is fatal
    /// before any state file is opened.
    pub fn from_env() -> Result<Self> {
        let handle = std::env::var(HANDLE_ENV)
            .map_err(|_| ConfigError::MissingCredential(HANDLE_ENV.to_string()))?;
        let app_password = std::env::var(PASSWORD_ENV)
            .map_err(|_| ConfigError::MissingCredential(PASSWORD_ENV.to_string()))?;

        if handle.trim().is_empty() {
            return Err(ConfigError::MissingCredential(HANDLE_ENV.to_string()).into());
        }
        if app_password.trim().is_empty() {
            return Err(ConfigError::MissingCredential(PASSWORD_ENV.to_string()).into());
        }

        Ok(Self {
            handle,
            app_password: SecretString::from(app_password),
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("handle", &self.handle)
            .field("app_password", &"[REDACTED]")
            .finish()
    }
}
