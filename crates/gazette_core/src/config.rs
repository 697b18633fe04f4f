//! TOML configuration for the publishing core.
//!
//! # Invariants
//! - Every section is optional; missing values fall back to defaults.
//! - A relative `database.path` is resolved against the config file's
//!   directory, not the working directory.
//! - Feed windows are validated on load: a config that would produce an
//!   empty or inverted "last 7 days" window is rejected.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DB_FILE_NAME: &str = "gazette.sqlite3";
/// Longest accepted feed window, about a century.
pub const MAX_FEED_WINDOW_DAYS: i64 = 36_500;

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse TOML config: {err}"),
            Self::Invalid { key, message } => write!(f, "invalid config `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GazetteConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub feeds: FeedConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_DB_FILE_NAME),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Absolute directory for rolling log files. File logging is off when unset.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    pub featured_limit: u32,
    pub today_window_hours: i64,
    pub recent_window_days: i64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            featured_limit: 3,
            today_window_hours: 24,
            recent_window_days: 7,
        }
    }
}

impl GazetteConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a TOML file and resolves relative paths against its directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents)?;
        if let Some(base_dir) = path.parent() {
            config.database.path = resolve_relative(&config.database.path, base_dir);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feeds.featured_limit == 0 {
            return Err(ConfigError::Invalid {
                key: "feeds.featured_limit",
                message: "must be at least 1".to_string(),
            });
        }
        if self.feeds.today_window_hours <= 0
            || self.feeds.today_window_hours > MAX_FEED_WINDOW_DAYS * 24
        {
            return Err(ConfigError::Invalid {
                key: "feeds.today_window_hours",
                message: format!(
                    "must be between 1 and {}, got {}",
                    MAX_FEED_WINDOW_DAYS * 24,
                    self.feeds.today_window_hours
                ),
            });
        }
        if self.feeds.recent_window_days > MAX_FEED_WINDOW_DAYS {
            return Err(ConfigError::Invalid {
                key: "feeds.recent_window_days",
                message: format!(
                    "must be at most {MAX_FEED_WINDOW_DAYS}, got {}",
                    self.feeds.recent_window_days
                ),
            });
        }
        if self.feeds.recent_window_days * 24 <= self.feeds.today_window_hours {
            return Err(ConfigError::Invalid {
                key: "feeds.recent_window_days",
                message: format!(
                    "must cover more than today_window_hours ({}h), got {}d",
                    self.feeds.today_window_hours, self.feeds.recent_window_days
                ),
            });
        }
        if let Some(dir) = self.logging.dir.as_deref() {
            if !dir.is_absolute() {
                return Err(ConfigError::Invalid {
                    key: "logging.dir",
                    message: format!("must be an absolute path, got `{}`", dir.display()),
                });
            }
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "database.path",
                message: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn resolve_relative(path: &Path, base_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
