use std::fmt;

use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder};
use tracing::info;

use super::params::Params;
use super::query::{build_result_set, mysql_error};
use crate::backend::Backend;
use crate::config::ConnectionOptions;
use crate::error::DbError;
use crate::params::{ParamConverter, QueryParam};
use crate::results::ResultSet;
use crate::types::DatabaseType;

pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Session statement for a `±H:MM` zone string.
fn time_zone_statement(zone: &str) -> String {
    format!("SET time_zone = '{zone}'")
}

/// A single MySQL session behind the `Backend` trait.
pub struct MysqlBackend {
    conn: Conn,
    host: String,
    database: String,
}

impl MysqlBackend {
    /// Connect over TCP and switch the session to utf8.
    ///
    /// # Errors
    ///
    /// Returns `DbError::ConnectionError` if the server cannot be reached or rejects the login.
    pub fn connect(options: &ConnectionOptions) -> Result<Self, DbError> {
        let port = options.port.unwrap_or(DEFAULT_MYSQL_PORT);
        let builder = OptsBuilder::new()
            .ip_or_hostname(Some(options.host.clone()))
            .tcp_port(port)
            .user(Some(options.user.clone()))
            .pass(Some(options.password.clone()))
            .db_name(Some(options.database.clone()))
            .init(vec!["SET NAMES utf8"]);

        let conn = Conn::new(builder).map_err(|e| {
            DbError::ConnectionError(format!(
                "Failed to connect to MySQL at {}:{port}: {e}",
                options.host
            ))
        })?;
        info!(host = %options.host, port, database = %options.database, "opened mysql connection");

        Ok(Self {
            conn,
            host: options.host.clone(),
            database: options.database.clone(),
        })
    }
}

impl Backend for MysqlBackend {
    fn query(&mut self, sql: &str) -> Result<ResultSet, DbError> {
        let result = self.conn.query_iter(sql).map_err(|e| mysql_error(&e))?;
        let rows_affected = result.affected_rows();
        let last_insert_id = result.last_insert_id();
        let columns = result.columns().as_ref().to_vec();
        build_result_set(&columns, result, rows_affected, last_insert_id)
    }

    fn exec(&mut self, sql: &str, params: &[QueryParam]) -> Result<ResultSet, DbError> {
        let params = Params::convert_sql_params(params)?.into_positional();
        let result = self
            .conn
            .exec_iter(sql, params)
            .map_err(|e| mysql_error(&e))?;
        let rows_affected = result.affected_rows();
        let last_insert_id = result.last_insert_id();
        let columns = result.columns().as_ref().to_vec();
        build_result_set(&columns, result, rows_affected, last_insert_id)
    }

    fn set_session_time_zone(&mut self, zone: &str) -> Result<(), DbError> {
        self.conn
            .query_drop(time_zone_statement(zone))
            .map_err(|e| mysql_error(&e))
    }

    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mysql
    }

    fn close(self: Box<Self>) -> Result<(), DbError> {
        let MysqlBackend {
            conn,
            host,
            database,
        } = *self;
        // Dropping the connection sends COM_QUIT.
        drop(conn);
        info!(host = %host, database = %database, "closed mysql connection");
        Ok(())
    }
}

impl fmt::Debug for MysqlBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlBackend")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("connection_id", &self.conn.connection_id())
            .finish()
    }
}
