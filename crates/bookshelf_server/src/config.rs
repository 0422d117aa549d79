//! Process configuration read from environment variables.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults.
//! - A variable that is set but cannot be parsed is an error, never ignored,
//!   except `LOG_LEVEL`: an unknown level falls back to `info` and is kept in
//!   `AppConfig::rejected_log_level` so startup can warn about it.

use bookshelf_core::supported_log_level;
use bookshelf_http::ServerConfig;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const DEFAULT_DB_NAME: &str = "books";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { var, value, reason } => {
                write!(f, "invalid value `{value}` for {var}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Database connection settings.
///
/// `user`, `password`, `host` and `port` are carried for deployments that
/// share environment files with networked backends; the embedded store only
/// reads `path` and `name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
    pub name: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            name: DEFAULT_DB_NAME.to_string(),
            user: None,
            password: None,
            host: None,
            port: None,
        }
    }
}

impl DatabaseConfig {
    /// File the store is opened from: `DB_PATH`, else `<DB_NAME>.sqlite3`.
    pub fn file_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.sqlite3", self.name)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub log_level: String,
    pub log_dir: Option<String>,
    /// Raw `LOG_LEVEL` value that was not a known level.
    pub rejected_log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_dir: None,
            rejected_log_level: None,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// Supported env vars: `HOST`, `PORT`, `DB_PATH`, `DB_NAME`, `DB_USER`,
    /// `DB_PASSWORD`, `DB_HOST`, `DB_PORT`, `LOG_LEVEL`, `LOG_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::from_env`] with an injected variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.server.host = host;
        }
        if let Some(port) = parse_port("PORT", get("PORT"))? {
            config.server.port = port;
        }

        config.database.path = get("DB_PATH").map(PathBuf::from);
        if let Some(name) = get("DB_NAME") {
            config.database.name = name;
        }
        config.database.user = get("DB_USER");
        config.database.password = lookup("DB_PASSWORD");
        config.database.host = get("DB_HOST");
        config.database.port = parse_port("DB_PORT", get("DB_PORT"))?;

        if let Some(level) = get("LOG_LEVEL") {
            match supported_log_level(&level) {
                Some(known) => config.log_level = known.to_string(),
                None => config.rejected_log_level = Some(level),
            }
        }
        config.log_dir = get("LOG_DIR");

        Ok(config)
    }
}

fn parse_port(var: &'static str, raw: Option<String>) -> Result<Option<u16>, ConfigError> {
    raw.map(|value| {
        value
            .parse::<u16>()
            .map_err(|err| ConfigError::InvalidValue {
                var,
                reason: err.to_string(),
                value,
            })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.file_path(), PathBuf::from("books.sqlite3"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("DB_NAME", "library"),
            ("DB_USER", "reader"),
            ("DB_PORT", "3306"),
            ("LOG_LEVEL", "debug"),
            ("LOG_DIR", "/var/log/bookshelf"),
        ])
        .unwrap();

        assert_eq!(config.server.socket_addr(), "127.0.0.1:3000");
        assert_eq!(config.database.file_path(), PathBuf::from("library.sqlite3"));
        assert_eq!(config.database.user.as_deref(), Some("reader"));
        assert_eq!(config.database.port, Some(3306));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/bookshelf"));
    }

    #[test]
    fn db_path_wins_over_db_name() {
        let config = load(&[("DB_PATH", "/data/shelf.db"), ("DB_NAME", "library")]).unwrap();
        assert_eq!(config.database.file_path(), PathBuf::from("/data/shelf.db"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("PORT", "  "), ("DB_NAME", "")]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.name, "books");
    }

    #[test]
    fn log_level_is_normalized() {
        let config = load(&[("LOG_LEVEL", "WARNING")]).unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.rejected_log_level, None);
    }

    #[test]
    fn unknown_log_level_falls_back_to_info() {
        let config = load(&[("LOG_LEVEL", "verbose")]).unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.rejected_log_level.as_deref(), Some("verbose"));
    }

    #[test]
    fn unparsable_port_is_rejected() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        let ConfigError::InvalidValue { var, value, .. } = &err;
        assert_eq!(*var, "PORT");
        assert_eq!(value, "eighty");
        assert!(err.to_string().contains("PORT"));

        let err = load(&[("DB_PORT", "70000")]).unwrap_err();
        assert!(err.to_string().contains("DB_PORT"));
    }
}
