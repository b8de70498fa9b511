//! Explicit runtime configuration for the note graph.
//!
//! # Responsibility
//! - Describe where the store lives and how connections are tuned.
//! - Parse configuration from environment variables for binaries.
//!
//! # Invariants
//! - No ambient global: every store is opened from a [`StoreConfig`] value.
//! - Parsing never panics; malformed values surface as [`ConfigError`].

use crate::graph::TraversalLimits;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "NOTEGRAPH_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "NOTEGRAPH_BUSY_TIMEOUT_MS";
pub const ENV_MAX_TRAVERSAL_RESULTS: &str = "NOTEGRAPH_MAX_TRAVERSAL_RESULTS";
pub const ENV_LOG_LEVEL: &str = "NOTEGRAPH_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEGRAPH_LOG_DIR";

/// Busy timeout applied when none is configured.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const IN_MEMORY_MARKER: &str = ":memory:";

/// Configuration parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is present but cannot be parsed.
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value `{value}` for {key}: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Physical location of the SQLite database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    /// Database file on disk; created on first open.
    File(PathBuf),
    /// Private in-memory database, dropped with its connection.
    InMemory,
}

impl DatabaseLocation {
    pub(crate) fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::InMemory => "memory",
        }
    }
}

/// Settings used when opening a [`crate::NoteGraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: DatabaseLocation,
    /// How long a writer waits for the database write lock.
    pub busy_timeout: Duration,
    pub traversal_limits: TraversalLimits,
}

impl StoreConfig {
    /// File-backed store with default tuning.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DatabaseLocation::File(path.into()),
            ..Self::default()
        }
    }

    /// In-memory store with default tuning.
    pub fn in_memory() -> Self {
        Self::default()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: DatabaseLocation::InMemory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            traversal_limits: TraversalLimits::default(),
        }
    }
}

/// File logging settings consumed by [`crate::init_logging`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    /// Absolute log directory. `None` disables the file sink.
    pub dir: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            dir: None,
        }
    }
}

/// Full process configuration for binaries embedding the core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub logging: LogSettings,
}

impl AppConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Unset or blank variables fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let location = match read(ENV_DB_PATH) {
            None => DatabaseLocation::InMemory,
            Some(value) if value == IN_MEMORY_MARKER => DatabaseLocation::InMemory,
            Some(value) => DatabaseLocation::File(PathBuf::from(value)),
        };

        let busy_timeout = match read(ENV_BUSY_TIMEOUT_MS) {
            None => DEFAULT_BUSY_TIMEOUT,
            Some(value) => Duration::from_millis(parse_number(ENV_BUSY_TIMEOUT_MS, &value)?),
        };

        let max_results = match read(ENV_MAX_TRAVERSAL_RESULTS) {
            None => None,
            Some(value) => {
                let parsed = parse_number(ENV_MAX_TRAVERSAL_RESULTS, &value)?;
                if parsed == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_MAX_TRAVERSAL_RESULTS,
                        value,
                        reason: "must be greater than zero",
                    });
                }
                Some(usize::try_from(parsed).unwrap_or(usize::MAX))
            }
        };

        let mut logging = LogSettings::default();
        if let Some(level) = read(ENV_LOG_LEVEL) {
            logging.level = level;
        }
        logging.dir = read(ENV_LOG_DIR).map(PathBuf::from);

        Ok(Self {
            store: StoreConfig {
                location,
                busy_timeout,
                traversal_limits: TraversalLimits { max_results },
            },
            logging,
        })
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
        reason: "expected a non-negative integer",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_in_memory_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.store.location, DatabaseLocation::InMemory);
        assert_eq!(config.store.busy_timeout, DEFAULT_BUSY_TIMEOUT);
        assert_eq!(config.store.traversal_limits.max_results, None);
        assert_eq!(config.logging.dir, None);
    }

    #[test]
    fn reads_all_supported_variables() {
        let config = AppConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/tmp/notes.db"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
            (ENV_MAX_TRAVERSAL_RESULTS, "1000"),
            (ENV_LOG_LEVEL, "warn"),
            (ENV_LOG_DIR, "/var/log/notegraph"),
        ]))
        .unwrap();

        assert_eq!(
            config.store.location,
            DatabaseLocation::File(PathBuf::from("/tmp/notes.db"))
        );
        assert_eq!(config.store.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.store.traversal_limits.max_results, Some(1000));
        assert_eq!(config.logging.level, "warn");
        assert_eq!(
            config.logging.dir,
            Some(PathBuf::from("/var/log/notegraph"))
        );
    }

    #[test]
    fn memory_marker_and_blank_path_mean_in_memory() {
        let marker = AppConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, ":memory:")])).unwrap();
        assert_eq!(marker.store.location, DatabaseLocation::InMemory);

        let blank = AppConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "   ")])).unwrap();
        assert_eq!(blank.store.location, DatabaseLocation::InMemory);
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = AppConfig::from_lookup(lookup_from(&[(ENV_BUSY_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key, .. } if key == ENV_BUSY_TIMEOUT_MS
        ));

        let err = AppConfig::from_lookup(lookup_from(&[(ENV_MAX_TRAVERSAL_RESULTS, "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }
}
