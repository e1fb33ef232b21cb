//! Application configuration.
//!
//! # Responsibility
//! - Resolve store location, testing mode and logging settings from the
//!   process environment (optionally seeded from a `.env` file).
//!
//! # Invariants
//! - Missing variables fall back to defaults; malformed ones are errors.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const DATABASE_URI_VAR: &str = "DATABASE_URI";
pub const TESTING_VAR: &str = "CATALOG_TESTING";
pub const LOG_LEVEL_VAR: &str = "CATALOG_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "CATALOG_LOG_DIR";

pub const DEFAULT_DATABASE_URI: &str = "sqlite::memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidFlag { var: &'static str, value: String },
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidFlag { var, value } => write!(
                f,
                "{var} must be one of true|false|1|0|yes|no, got `{value}`"
            ),
            Self::InvalidLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Runtime settings for one application instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_uri: String,
    pub testing: bool,
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_uri: DEFAULT_DATABASE_URI.to_string(),
            testing: false,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the environment after reading `.env`, if any.
    ///
    /// # Errors
    /// - Returns `ConfigError` when a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is normal outside development.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(uri) = non_empty(lookup(DATABASE_URI_VAR)) {
            config.database_uri = uri;
        }
        if let Some(value) = non_empty(lookup(TESTING_VAR)) {
            config.testing = parse_flag(TESTING_VAR, &value)?;
        }
        if let Some(level) = non_empty(lookup(LOG_LEVEL_VAR)) {
            config.log_level = normalize_level(&level)
                .ok_or_else(|| ConfigError::InvalidLogLevel(level.clone()))?
                .to_string();
        }
        if let Some(dir) = non_empty(lookup(LOG_DIR_VAR)) {
            config.log_dir = Some(PathBuf::from(dir));
        }

        Ok(config)
    }

    /// Returns a copy configured for test runs.
    pub fn for_testing(database_uri: impl Into<String>) -> Self {
        Self {
            database_uri: database_uri.into(),
            testing: true,
            log_level: "error".to_string(),
            log_dir: None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            var,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, DEFAULT_DATABASE_URI};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.database_uri, DEFAULT_DATABASE_URI);
        assert!(!config.testing);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn reads_all_variables() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URI", "sqlite:///var/lib/catalog.db"),
            ("CATALOG_TESTING", "YES"),
            ("CATALOG_LOG_LEVEL", "Critical"),
            ("CATALOG_LOG_DIR", "/var/log/catalog"),
        ]))
        .unwrap();

        assert_eq!(config.database_uri, "sqlite:///var/lib/catalog.db");
        assert!(config.testing);
        assert_eq!(config.log_level, "error");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/catalog")));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config =
            AppConfig::from_lookup(lookup_from(&[("DATABASE_URI", "   "), ("CATALOG_TESTING", "")]))
                .unwrap();
        assert_eq!(config.database_uri, DEFAULT_DATABASE_URI);
        assert!(!config.testing);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = AppConfig::from_lookup(lookup_from(&[("CATALOG_TESTING", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFlag { var: "CATALOG_TESTING", .. }));

        let err = AppConfig::from_lookup(lookup_from(&[("CATALOG_LOG_LEVEL", "loud")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidLogLevel("loud".to_string()));
    }
}
