use chrono::NaiveDateTime;

use crate::error::DbError;
use crate::types::RowValues;

/// Bind type of a parameter, with the one-letter code prepared statements use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Integer,
    Double,
    String,
    Blob,
}

impl ParamKind {
    #[must_use]
    pub fn bind_code(self) -> char {
        match self {
            ParamKind::Integer => 'i',
            ParamKind::Double => 'd',
            ParamKind::String => 's',
            ParamKind::Blob => 'b',
        }
    }
}

/// A value bound to a `?` placeholder.
///
/// Build these with `From`; the variant chosen by the conversion is the bind
/// type, so inference happens once at the call site:
/// ```rust
/// use db_facade::prelude::*;
///
/// let params: Vec<QueryParam> = vec![7.into(), 2.5.into(), "bob".into()];
/// assert_eq!(bind_signature(&params), "ids");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
    /// SQL NULL. Classified as a blob bind.
    Null,
}

impl QueryParam {
    /// Every parameter classifies into exactly one kind; anything that is not an
    /// integer, double or string binds as a blob.
    #[must_use]
    pub fn kind(&self) -> ParamKind {
        match self {
            QueryParam::Int(_) => ParamKind::Integer,
            QueryParam::Float(_) => ParamKind::Double,
            QueryParam::Text(_) => ParamKind::String,
            QueryParam::Blob(_) | QueryParam::Null => ParamKind::Blob,
        }
    }
}

/// Concatenated bind codes for a parameter list, e.g. `"isb"`.
#[must_use]
pub fn bind_signature(params: &[QueryParam]) -> String {
    params.iter().map(|p| p.kind().bind_code()).collect()
}

/// Convert a slice of `QueryParam` into a driver's parameter container.
pub trait ParamConverter: Sized {
    /// # Errors
    ///
    /// Returns `DbError::ParameterError` if a value cannot be represented by the driver.
    fn convert_sql_params(params: &[QueryParam]) -> Result<Self, DbError>;
}

macro_rules! int_param {
    ($($t:ty),*) => {
        $(
            impl From<$t> for QueryParam {
                fn from(value: $t) -> Self {
                    QueryParam::Int(i64::from(value))
                }
            }
        )*
    };
}

int_param!(i8, i16, i32, i64, u8, u16, u32, bool);

impl From<f32> for QueryParam {
    fn from(value: f32) -> Self {
        QueryParam::Float(f64::from(value))
    }
}

impl From<f64> for QueryParam {
    fn from(value: f64) -> Self {
        QueryParam::Float(value)
    }
}

impl From<&str> for QueryParam {
    fn from(value: &str) -> Self {
        QueryParam::Text(value.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(value: String) -> Self {
        QueryParam::Text(value)
    }
}

impl From<&String> for QueryParam {
    fn from(value: &String) -> Self {
        QueryParam::Text(value.clone())
    }
}

impl From<NaiveDateTime> for QueryParam {
    fn from(value: NaiveDateTime) -> Self {
        QueryParam::Text(value.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

impl From<Vec<u8>> for QueryParam {
    fn from(value: Vec<u8>) -> Self {
        QueryParam::Blob(value)
    }
}

impl From<&[u8]> for QueryParam {
    fn from(value: &[u8]) -> Self {
        QueryParam::Blob(value.to_vec())
    }
}

impl<T: Into<QueryParam>> From<Option<T>> for QueryParam {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryParam::Null, Into::into)
    }
}

/// Lets a value read from one query feed the next one.
impl From<RowValues> for QueryParam {
    fn from(value: RowValues) -> Self {
        match value {
            RowValues::Int(i) => QueryParam::Int(i),
            RowValues::Float(f) => QueryParam::Float(f),
            RowValues::Text(s) => QueryParam::Text(s),
            RowValues::Blob(b) => QueryParam::Blob(b),
            RowValues::Timestamp(dt) => dt.into(),
            RowValues::Null => QueryParam::Null,
        }
    }
}

impl From<&RowValues> for QueryParam {
    fn from(value: &RowValues) -> Self {
        value.clone().into()
    }
}
