// SQLite backend
//
// - connection: opening the database and the `Backend` impl
// - params: parameter conversion from `QueryParam` to rusqlite values
// - query: row extraction and result set building

pub mod connection;
pub mod params;
pub mod query;

pub use connection::SqliteBackend;
pub use params::Params as SqliteParams;
pub use query::build_result_set;
