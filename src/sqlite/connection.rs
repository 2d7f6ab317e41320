use std::fmt;

use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info};

use super::params::Params;
use super::query::{build_result_set, sqlite_error};
use crate::backend::Backend;
use crate::config::ConnectionOptions;
use crate::error::DbError;
use crate::params::{ParamConverter, QueryParam};
use crate::results::ResultSet;
use crate::types::DatabaseType;

/// `SQLite` connection behind the `Backend` trait.
///
/// `SQLite` has no session time zone; the zone string is kept so callers can
/// read it back, but timestamps are not shifted.
pub struct SqliteBackend {
    conn: Connection,
    path: String,
    time_zone: Option<String>,
}

impl SqliteBackend {
    /// Open the database file (or `:memory:`) named by `options.database`.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConnectionError` if the file cannot be opened.
    pub fn connect(options: &ConnectionOptions) -> Result<Self, DbError> {
        let path = options.database.clone();
        let conn = Connection::open(&path).map_err(|e| {
            DbError::ConnectionError(format!("Failed to open SQLite database {path}: {e}"))
        })?;
        info!(path = %path, "opened sqlite connection");
        Ok(Self {
            conn,
            path,
            time_zone: None,
        })
    }

    /// Zone last applied with `set_session_time_zone`.
    #[must_use]
    pub fn time_zone(&self) -> Option<&str> {
        self.time_zone.as_deref()
    }

    /// Statements without result columns are executed for their change count;
    /// everything else is read as rows.
    fn run(&self, sql: &str, values: &[rusqlite::types::Value]) -> Result<ResultSet, DbError> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| sqlite_error(&e))?;
        if stmt.column_count() > 0 {
            return build_result_set(&mut stmt, values);
        }

        let rowid_before = self.conn.last_insert_rowid();
        let changed = stmt
            .execute(params_from_iter(values.iter()))
            .map_err(|e| sqlite_error(&e))?;
        let rows_affected = u64::try_from(changed)
            .map_err(|e| DbError::ExecutionError(format!("Invalid SQLite change count: {e}")))?;
        // Only an INSERT moves the rowid; UPDATE and DELETE report no id.
        let rowid_after = self.conn.last_insert_rowid();
        let last_insert_id = if rows_affected > 0 && rowid_after != rowid_before {
            u64::try_from(rowid_after).ok()
        } else {
            None
        };
        Ok(ResultSet::affected(rows_affected, last_insert_id))
    }
}

impl Backend for SqliteBackend {
    fn query(&mut self, sql: &str) -> Result<ResultSet, DbError> {
        self.run(sql, &[])
    }

    fn exec(&mut self, sql: &str, params: &[QueryParam]) -> Result<ResultSet, DbError> {
        let params = Params::convert_sql_params(params)?;
        self.run(sql, params.as_values())
    }

    fn set_session_time_zone(&mut self, zone: &str) -> Result<(), DbError> {
        debug!(zone, "sqlite has no session time zone; recording only");
        self.time_zone = Some(zone.to_string());
        Ok(())
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn close(self: Box<Self>) -> Result<(), DbError> {
        let path = self.path;
        self.conn.close().map_err(|(_, e)| {
            DbError::ConnectionError(format!("Failed to close SQLite database {path}: {e}"))
        })?;
        info!(path = %path, "closed sqlite connection");
        Ok(())
    }
}

impl fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("path", &self.path)
            .field("time_zone", &self.time_zone)
            .finish_non_exhaustive()
    }
}
