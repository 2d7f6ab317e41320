use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::backend::{self, Backend};
use crate::config::ConnectionOptions;
use crate::error::DbError;
use crate::paging::{Page, count_from_scalar, derive_count_query, page_position, with_limit};
use crate::params::{QueryParam, bind_signature};
use crate::results::{Record, ResultSet};
use crate::timezone::session_zone_for_offset;
use crate::types::{DatabaseType, RowValues};

/// What the most recent call did. Reset at the start of every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionState {
    /// The call bound parameters through a prepared statement
    pub is_statement: bool,
    /// `None` until a call succeeds, and again after a failure
    pub affected_rows: Option<u64>,
    pub last_insert_id: Option<u64>,
    pub last_sql: Option<String>,
    pub last_error: Option<String>,
}

impl ExecutionState {
    fn begin(&mut self, sql: &str, is_statement: bool) {
        *self = ExecutionState {
            is_statement,
            last_sql: Some(sql.to_string()),
            ..ExecutionState::default()
        };
    }

    fn finish(&mut self, result: &ResultSet) {
        self.affected_rows = Some(result.rows_affected);
        self.last_insert_id = result.last_insert_id;
    }

    fn fail(&mut self, err: &DbError) {
        self.affected_rows = None;
        self.last_insert_id = None;
        self.last_error = Some(err.message());
    }
}

/// Query helper bound to one database connection.
///
/// Every call takes a parameter slice. An empty slice runs the SQL text as-is
/// (no escaping; the caller owns its safety). A non-empty slice prepares the
/// statement and binds the values to its `?` placeholders.
///
/// ```rust
/// use db_facade::prelude::*;
///
/// let mut db = QueryExecutor::connect(&ConnectionOptions::sqlite(":memory:".into()))?;
/// db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)", &[])?;
/// assert!(db.execute("INSERT INTO users (name) VALUES (?)", &["alice".into()])?);
///
/// let name = db.fetch_scalar("SELECT name FROM users WHERE id = ?", &[1.into()])?;
/// assert_eq!(name, Some(RowValues::Text("alice".into())));
/// # Ok::<(), DbError>(())
/// ```
pub struct QueryExecutor {
    backend: Option<Box<dyn Backend>>,
    state: ExecutionState,
    time_zone: String,
}

impl QueryExecutor {
    /// Open a connection for `options` and prepare the session (UTC zone).
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConnectionError` if the connection cannot be opened, or
    /// `DbError::ExecutionError` if the session setup fails.
    pub fn connect(options: &ConnectionOptions) -> Result<Self, DbError> {
        Self::with_backend(backend::connect(options)?)
    }

    /// Wrap an already open backend and prepare the session (UTC zone).
    ///
    /// # Errors
    ///
    /// Returns `DbError::ExecutionError` if the time zone cannot be applied.
    pub fn with_backend(backend: Box<dyn Backend>) -> Result<Self, DbError> {
        let mut executor = QueryExecutor {
            backend: Some(backend),
            state: ExecutionState::default(),
            time_zone: session_zone_for_offset(0),
        };
        executor.set_time_zone_offset(0)?;
        Ok(executor)
    }

    fn backend(&mut self) -> Result<&mut Box<dyn Backend>, DbError> {
        self.backend
            .as_mut()
            .ok_or_else(|| DbError::ConnectionError("connection already closed".to_string()))
    }

    /// Set the session time zone from a client-side minute offset.
    ///
    /// The sign is inverted (a client offset of `90` selects `-1:30`), see
    /// [`session_zone_for_offset`].
    ///
    /// # Errors
    ///
    /// Returns `DbError::ExecutionError` if the driver rejects the zone.
    pub fn set_time_zone_offset(&mut self, minutes: i32) -> Result<(), DbError> {
        let zone = session_zone_for_offset(minutes);
        debug!(minutes, zone = %zone, "setting session time zone");
        self.backend()?.set_session_time_zone(&zone)?;
        self.time_zone = zone;
        Ok(())
    }

    /// Zone string currently applied to the session, e.g. `+0:00`.
    #[must_use]
    pub fn time_zone(&self) -> &str {
        &self.time_zone
    }

    fn run(&mut self, sql: &str, params: &[QueryParam]) -> Result<ResultSet, DbError> {
        let is_statement = !params.is_empty();
        self.state.begin(sql, is_statement);

        let outcome = if is_statement {
            debug!(sql, binds = %bind_signature(params), "executing prepared statement");
            self.backend()
                .and_then(|backend| backend.exec(sql, params))
        } else {
            debug!(sql, "executing query");
            self.backend().and_then(|backend| backend.query(sql))
        };

        match outcome {
            Ok(result) => {
                self.state.finish(&result);
                Ok(result)
            }
            Err(err) => {
                warn!(sql, error = %err, "statement failed");
                self.state.fail(&err);
                Err(err)
            }
        }
    }

    /// Run an INSERT / UPDATE / DELETE (or any statement) and report whether it
    /// touched at least one row.
    ///
    /// `Ok(false)` means the statement ran but changed nothing; use
    /// [`affected_rows`](Self::affected_rows) for the exact count.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ExecutionError` carrying the driver message.
    pub fn execute(&mut self, sql: &str, params: &[QueryParam]) -> Result<bool, DbError> {
        let result = self.run(sql, params)?;
        Ok(result.rows_affected > 0)
    }

    /// All rows, in the order the driver returned them.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ExecutionError` carrying the driver message.
    pub fn fetch_rows(&mut self, sql: &str, params: &[QueryParam]) -> Result<Vec<Record>, DbError> {
        Ok(self.run(sql, params)?.into_rows())
    }

    /// Rows keyed by the value of `field_key`.
    ///
    /// Keys are the text form of the value (NULL is `""`). When a key repeats,
    /// the later row replaces the earlier one but keeps its position.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ExecutionError` if the query fails or `field_key` is not
    /// one of the result columns.
    pub fn fetch_map(
        &mut self,
        sql: &str,
        field_key: &str,
        params: &[QueryParam],
    ) -> Result<IndexMap<String, Record>, DbError> {
        let rows = self.fetch_rows(sql, params)?;
        let mut map = IndexMap::with_capacity(rows.len());
        for row in rows {
            let key = row
                .get(field_key)
                .ok_or_else(|| {
                    DbError::ExecutionError(format!("column `{field_key}` not found in result"))
                })?
                .to_string();
            map.insert(key, row);
        }
        Ok(map)
    }

    /// The first column of every row.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ExecutionError` carrying the driver message.
    pub fn fetch_column(
        &mut self,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<RowValues>, DbError> {
        Ok(self
            .fetch_rows(sql, params)?
            .into_iter()
            .filter_map(Record::into_first)
            .collect())
    }

    /// The first row, or `None` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ExecutionError` carrying the driver message.
    pub fn fetch_row(&mut self, sql: &str, params: &[QueryParam]) -> Result<Option<Record>, DbError> {
        Ok(self.fetch_rows(sql, params)?.into_iter().next())
    }

    /// The first column of the first row, or `None` when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ExecutionError` carrying the driver message.
    pub fn fetch_scalar(
        &mut self,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Option<RowValues>, DbError> {
        Ok(self.fetch_row(sql, params)?.and_then(Record::into_first))
    }

    /// One page of `sql`, counting the total with a `COUNT(*)` rewrite of it.
    ///
    /// The rewrite is textual and only handles a single top-level
    /// `SELECT ... FROM`; see [`derive_count_query`]. The same `params` are bound
    /// to both queries.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ParameterError` if `limit` is zero, or
    /// `DbError::ExecutionError` if either query fails.
    pub fn fetch_page(
        &mut self,
        sql: &str,
        offset: u64,
        limit: u64,
        params: &[QueryParam],
    ) -> Result<Page, DbError> {
        let count_sql = derive_count_query(sql).into_owned();
        self.fetch_page_with_count(sql, &count_sql, offset, limit, params)
    }

    /// Like [`fetch_page`](Self::fetch_page) with a caller-written count query.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ParameterError` if `limit` is zero, or
    /// `DbError::ExecutionError` if either query fails.
    pub fn fetch_page_with_count(
        &mut self,
        sql: &str,
        count_sql: &str,
        offset: u64,
        limit: u64,
        params: &[QueryParam],
    ) -> Result<Page, DbError> {
        // Validate before touching the database.
        page_position(offset, limit, 0)?;

        let count = count_from_scalar(self.fetch_scalar(count_sql, params)?.as_ref());
        let rows = self.fetch_rows(&with_limit(sql, offset, limit), params)?;
        let (page_number, is_last_page) = page_position(offset, limit, count)?;

        Ok(Page {
            count,
            rows,
            is_last_page,
            page_number,
        })
    }

    /// Rows affected by the last call, `None` if it failed.
    #[must_use]
    pub fn affected_rows(&self) -> Option<u64> {
        self.state.affected_rows
    }

    /// Driver message of the last failed call.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error.as_deref()
    }

    #[must_use]
    pub fn last_insert_id(&self) -> Option<u64> {
        self.state.last_insert_id
    }

    #[must_use]
    pub fn last_sql(&self) -> Option<&str> {
        self.state.last_sql.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    #[must_use]
    pub fn database_type(&self) -> Option<DatabaseType> {
        self.backend.as_ref().map(|b| b.database_type())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    /// Close the connection. Later calls fail with `ConnectionError`; closing
    /// twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConnectionError` if the driver reports a failure while closing.
    pub fn close(&mut self) -> Result<(), DbError> {
        match self.backend.take() {
            Some(backend) => backend.close(),
            None => Ok(()),
        }
    }
}

impl Drop for QueryExecutor {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "failed to close connection on drop");
        }
    }
}

impl fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("database_type", &self.database_type())
            .field("time_zone", &self.time_zone)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
