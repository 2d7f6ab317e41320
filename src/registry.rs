use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::info;

use crate::config::{DEFAULT_KEY, DbConfig};
use crate::error::DbError;
use crate::executor::QueryExecutor;

/// Connections by configuration key, opened on first use.
///
/// Build one at startup and pass it (or the executors it hands out) to the
/// code that needs a database. At most one connection exists per key.
///
/// ```rust
/// use db_facade::prelude::*;
///
/// let config = DbConfig::new()
///     .with_connection("master", ConnectionOptions::sqlite(":memory:".into()));
/// let mut registry = ConnectionRegistry::new(config);
///
/// let one = registry.master()?.fetch_scalar("SELECT 1", &[])?;
/// assert_eq!(one, Some(RowValues::Int(1)));
/// assert!(registry.get("missing").is_err());
/// # Ok::<(), DbError>(())
/// ```
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    config: DbConfig,
    connections: HashMap<String, QueryExecutor>,
}

impl ConnectionRegistry {
    #[must_use]
    pub fn new(config: DbConfig) -> Self {
        Self {
            config,
            connections: HashMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// The executor for `key`, connecting if this is the first request for it
    /// or if the cached executor was closed directly.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConfigError` for an unknown key, or the connection error
    /// if the first connect fails (nothing is cached in that case).
    pub fn get(&mut self, key: &str) -> Result<&mut QueryExecutor, DbError> {
        match self.connections.entry(key.to_string()) {
            Entry::Occupied(entry) if !entry.get().is_closed() => Ok(entry.into_mut()),
            Entry::Occupied(mut entry) => {
                // Closed through the executor itself; replace the dead handle.
                let options = self.config.get(key)?;
                let executor = QueryExecutor::connect(options)?;
                info!(key, backend = %options.backend, "reconnected closed connection");
                entry.insert(executor);
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                let options = self.config.get(key)?;
                let executor = QueryExecutor::connect(options)?;
                info!(key, backend = %options.backend, "registered connection");
                Ok(entry.insert(executor))
            }
        }
    }

    /// Shorthand for the `"master"` key.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn master(&mut self) -> Result<&mut QueryExecutor, DbError> {
        self.get(DEFAULT_KEY)
    }

    /// Whether a connection for `key` is currently open.
    #[must_use]
    pub fn is_connected(&self, key: &str) -> bool {
        self.connections
            .get(key)
            .is_some_and(|executor| !executor.is_closed())
    }

    /// Close and forget the connection for `key`, returning whether one was open.
    /// The next `get` reconnects.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConnectionError` if the driver fails while closing.
    pub fn close(&mut self, key: &str) -> Result<bool, DbError> {
        match self.connections.remove(key) {
            Some(mut executor) => {
                let was_open = !executor.is_closed();
                executor.close()?;
                Ok(was_open)
            }
            None => Ok(false),
        }
    }

    /// Close every open connection, returning the first error seen.
    ///
    /// # Errors
    ///
    /// Returns the first `DbError::ConnectionError` raised while closing.
    pub fn close_all(&mut self) -> Result<(), DbError> {
        let mut first_error = None;
        for (key, mut executor) in self.connections.drain() {
            if let Err(err) = executor.close() {
                tracing::warn!(key = %key, error = %err, "failed to close connection");
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
