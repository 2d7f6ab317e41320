use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DbError;
use crate::types::DatabaseType;

/// Configuration key used when the caller does not name one.
pub const DEFAULT_KEY: &str = "master";

/// Connection parameters for one configuration key.
///
/// The original config files name the host `server` and the database `name`;
/// both spellings are accepted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionOptions {
    #[serde(default)]
    pub backend: DatabaseType,
    #[serde(default, alias = "server")]
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Schema name for MySQL, file path (or `:memory:`) for `SQLite`.
    #[serde(alias = "name")]
    pub database: String,
}

impl ConnectionOptions {
    #[must_use]
    pub fn mysql(host: String, user: String, password: String, database: String) -> Self {
        Self {
            backend: DatabaseType::Mysql,
            host,
            port: None,
            user,
            password,
            database,
        }
    }

    #[must_use]
    pub fn sqlite(path: String) -> Self {
        Self {
            backend: DatabaseType::Sqlite,
            host: String::new(),
            port: None,
            user: String::new(),
            password: String::new(),
            database: path,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionOptions")
            .field("backend", &self.backend)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("database", &self.database)
            .finish()
    }
}

/// Fluent builder for `ConnectionOptions`.
#[derive(Debug, Clone)]
pub struct ConnectionOptionsBuilder {
    opts: ConnectionOptions,
}

impl ConnectionOptionsBuilder {
    #[must_use]
    pub fn new(backend: DatabaseType, database: String) -> Self {
        let mut opts = ConnectionOptions::sqlite(database);
        opts.backend = backend;
        Self { opts }
    }

    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.opts.host = host.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = Some(port);
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.opts.user = user.into();
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = password.into();
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectionOptions {
        self.opts
    }
}

/// All known configuration keys and their connection parameters.
///
/// Usually loaded once at startup and handed to a `ConnectionRegistry`:
/// ```rust
/// use db_facade::prelude::*;
///
/// let config = DbConfig::from_json_str(
///     r#"{ "master": { "server": "db1", "user": "app", "password": "x", "name": "shop" } }"#,
/// )?;
/// assert_eq!(config.get("master")?.host, "db1");
/// assert!(config.get("replica").is_err());
/// # Ok::<(), DbError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DbConfig {
    connections: BTreeMap<String, ConnectionOptions>,
}

impl DbConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns `DbError::Json` if the document is not a key → options object.
    pub fn from_json_str(json: &str) -> Result<Self, DbError> {
        Ok(serde_json::from_str(json)?)
    }

    /// # Errors
    ///
    /// Returns `DbError::Io` if the file cannot be read, `DbError::Json` if it does not parse.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    #[must_use]
    pub fn with_connection(mut self, key: impl Into<String>, options: ConnectionOptions) -> Self {
        self.insert(key, options);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, options: ConnectionOptions) {
        self.connections.insert(key.into(), options);
    }

    /// Look up the options for `key`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConfigError` if the key is not configured.
    pub fn get(&self, key: &str) -> Result<&ConnectionOptions, DbError> {
        self.connections
            .get(key)
            .ok_or_else(|| DbError::ConfigError(format!("There is no such key: {key}")))
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.connections.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.connections.keys().map(String::as_str)
    }
}
