use mysql::Value;

use crate::error::DbError;
use crate::params::{ParamConverter, QueryParam};

/// Convert a single `QueryParam` to a mysql `Value`.
///
/// Strings and blobs both travel as bytes; the bind kind only decides how the
/// value was classified on the way in.
#[must_use]
pub fn query_param_to_mysql_value(value: &QueryParam) -> Value {
    match value {
        QueryParam::Int(i) => Value::Int(*i),
        QueryParam::Float(f) => Value::Double(*f),
        QueryParam::Text(s) => Value::Bytes(s.as_bytes().to_vec()),
        QueryParam::Blob(bytes) => Value::Bytes(bytes.clone()),
        QueryParam::Null => Value::NULL,
    }
}

/// Positional MySQL parameters.
#[derive(Debug, Clone, Default)]
pub struct Params(pub Vec<Value>);

impl Params {
    #[must_use]
    pub fn into_positional(self) -> mysql::Params {
        if self.0.is_empty() {
            mysql::Params::Empty
        } else {
            mysql::Params::Positional(self.0)
        }
    }
}

impl ParamConverter for Params {
    fn convert_sql_params(params: &[QueryParam]) -> Result<Self, DbError> {
        Ok(Params(params.iter().map(query_param_to_mysql_value).collect()))
    }
}
