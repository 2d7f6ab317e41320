use rusqlite::types::Value;

use crate::error::DbError;
use crate::params::{ParamConverter, QueryParam};

/// Convert a single `QueryParam` to a rusqlite `Value`.
#[must_use]
pub fn query_param_to_sqlite_value(value: &QueryParam) -> Value {
    match value {
        QueryParam::Int(i) => Value::Integer(*i),
        QueryParam::Float(f) => Value::Real(*f),
        QueryParam::Text(s) => Value::Text(s.clone()),
        QueryParam::Blob(bytes) => Value::Blob(bytes.clone()),
        QueryParam::Null => Value::Null,
    }
}

/// Owned `SQLite` parameter container.
#[derive(Debug, Clone, Default)]
pub struct Params(pub Vec<Value>);

impl Params {
    /// Borrow the underlying values.
    #[must_use]
    pub fn as_values(&self) -> &[Value] {
        &self.0
    }
}

impl ParamConverter for Params {
    fn convert_sql_params(params: &[QueryParam]) -> Result<Self, DbError> {
        Ok(Params(params.iter().map(query_param_to_sqlite_value).collect()))
    }
}
