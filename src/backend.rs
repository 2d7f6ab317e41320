use crate::config::ConnectionOptions;
use crate::error::DbError;
use crate::params::QueryParam;
use crate::results::ResultSet;
use crate::types::DatabaseType;

/// One open driver connection.
///
/// `QueryExecutor` only talks to the database through this trait; each
/// supported engine provides an implementation.
pub trait Backend: Send {
    /// Run literal SQL with no parameter binding.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ExecutionError` carrying the driver's message.
    fn query(&mut self, sql: &str) -> Result<ResultSet, DbError>;

    /// Prepare `sql` and execute it with positional parameters.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ExecutionError` carrying the driver's message.
    fn exec(&mut self, sql: &str, params: &[QueryParam]) -> Result<ResultSet, DbError>;

    /// Apply a `±H:MM` zone to the session.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ExecutionError` if the driver rejects the zone.
    fn set_session_time_zone(&mut self, zone: &str) -> Result<(), DbError>;

    fn database_type(&self) -> DatabaseType;

    /// Close the underlying handle.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConnectionError` if the driver reports a failure while closing.
    fn close(self: Box<Self>) -> Result<(), DbError>;
}

/// Open a connection for the backend named in `options`.
///
/// # Errors
///
/// Returns `DbError::ConnectionError` if the connection cannot be established, or
/// `DbError::ConfigError` if the backend was compiled out.
pub fn connect(options: &ConnectionOptions) -> Result<Box<dyn Backend>, DbError> {
    match options.backend {
        #[cfg(feature = "mysql")]
        DatabaseType::Mysql => Ok(Box::new(crate::mysql::MysqlBackend::connect(options)?)),
        #[cfg(feature = "sqlite")]
        DatabaseType::Sqlite => Ok(Box::new(crate::sqlite::SqliteBackend::connect(options)?)),
        #[allow(unreachable_patterns)]
        other => Err(DbError::ConfigError(format!(
            "backend `{other}` is not enabled in this build"
        ))),
    }
}
