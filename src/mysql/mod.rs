// MySQL backend
//
// - connection: session setup and the `Backend` impl
// - params: parameter conversion from `QueryParam` to mysql values
// - query: value decoding and result set building

pub mod connection;
pub mod params;
pub mod query;

pub use connection::{DEFAULT_MYSQL_PORT, MysqlBackend};
pub use params::Params as MysqlParams;
pub use query::build_result_set;
