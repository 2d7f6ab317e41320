//! Convenient imports for common functionality.

pub use crate::backend::Backend;
pub use crate::config::{ConnectionOptions, ConnectionOptionsBuilder, DEFAULT_KEY, DbConfig};
pub use crate::error::DbError;
pub use crate::executor::{ExecutionState, QueryExecutor};
pub use crate::paging::Page;
pub use crate::params::{ParamKind, QueryParam, bind_signature};
pub use crate::registry::ConnectionRegistry;
pub use crate::results::{Record, ResultSet};
pub use crate::timezone::session_zone_for_offset;
pub use crate::types::{DatabaseType, RowValues};

#[cfg(feature = "mysql")]
pub use crate::mysql::MysqlBackend;
#[cfg(feature = "sqlite")]
pub use crate::sqlite::SqliteBackend;
