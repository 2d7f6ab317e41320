//! Single-connection query helper for MySQL and `SQLite`.
//!
//! A [`QueryExecutor`] owns one driver connection and offers a handful of
//! result shapes over it: every row, rows keyed by a column, the first column,
//! the first row, a single value, and an offset page with a total count.
//! Connections are looked up by configuration key through a
//! [`ConnectionRegistry`].

pub mod backend;
pub mod config;
pub mod error;
pub mod executor;
pub mod paging;
pub mod params;
pub mod prelude;
pub mod registry;
pub mod results;
pub mod timezone;
pub mod types;

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use backend::Backend;
pub use config::{ConnectionOptions, ConnectionOptionsBuilder, DEFAULT_KEY, DbConfig};
pub use error::DbError;
pub use executor::{ExecutionState, QueryExecutor};
pub use paging::Page;
pub use params::{ParamKind, QueryParam};
pub use registry::ConnectionRegistry;
pub use results::{Record, ResultSet};
pub use types::{DatabaseType, RowValues};
