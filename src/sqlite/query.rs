use std::sync::Arc;

use rusqlite::types::Value;
use rusqlite::{Statement, params_from_iter};

use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::RowValues;

pub(crate) fn sqlite_error(err: &rusqlite::Error) -> DbError {
    DbError::ExecutionError(err.to_string())
}

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `DbError::ExecutionError` if the value cannot be read.
pub fn sqlite_extract_value(row: &rusqlite::Row, idx: usize) -> Result<RowValues, DbError> {
    let value: Value = row.get(idx).map_err(|e| sqlite_error(&e))?;
    Ok(match value {
        Value::Null => RowValues::Null,
        Value::Integer(i) => RowValues::Int(i),
        Value::Real(f) => RowValues::Float(f),
        Value::Text(s) => RowValues::Text(s),
        Value::Blob(b) => RowValues::Blob(b),
    })
}

/// Run a statement that returns columns and collect every row.
///
/// # Errors
///
/// Returns `DbError::ExecutionError` if stepping the statement or reading a value fails.
pub fn build_result_set(stmt: &mut Statement, params: &[Value]) -> Result<ResultSet, DbError> {
    let column_names: Vec<String> = stmt
        .column_names()
        .iter()
        .map(std::string::ToString::to_string)
        .collect();
    let col_count = column_names.len();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(Arc::new(column_names));

    let mut rows_iter = stmt
        .query(params_from_iter(params.iter()))
        .map_err(|e| sqlite_error(&e))?;

    while let Some(row) = rows_iter.next().map_err(|e| sqlite_error(&e))? {
        let mut row_values = Vec::with_capacity(col_count);
        for i in 0..col_count {
            row_values.push(sqlite_extract_value(row, i)?);
        }
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}
