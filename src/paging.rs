use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::DbError;
use crate::results::Record;
use crate::types::RowValues;

lazy_static! {
    // Greedy up to the last FROM that still leaves a match; one substitution only.
    static ref SELECT_FROM: Regex =
        Regex::new(r"(?is)^\s*SELECT.+FROM(?P<rest>.*)$").expect("static pattern compiles");
}

/// Rewrite the select list of `sql` into `COUNT(*)`.
///
/// This is a plain text substitution, not a parse: a query whose select list or
/// trailing clauses contain another `FROM` (subqueries, `EXTRACT(... FROM ...)`)
/// is rewritten at the wrong place. Use `QueryExecutor::fetch_page_with_count`
/// for such queries. Text that does not look like a SELECT is returned unchanged.
#[must_use]
pub fn derive_count_query(sql: &str) -> Cow<'_, str> {
    SELECT_FROM.replacen(sql, 1, "SELECT COUNT(*) FROM${rest}")
}

/// Append MySQL's `LIMIT offset, count` clause.
#[must_use]
pub fn with_limit(sql: &str, offset: u64, limit: u64) -> String {
    format!("{sql} LIMIT {offset}, {limit} ")
}

/// One page of results together with the numbers needed to render a pager.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    /// Rows matched by the query without the LIMIT
    pub count: u64,
    pub rows: Vec<Record>,
    pub is_last_page: bool,
    /// 1-based
    pub page_number: u64,
}

/// Page number and last-page flag for an offset window.
///
/// # Errors
///
/// Returns `DbError::ParameterError` if `limit` is zero.
pub fn page_position(offset: u64, limit: u64, count: u64) -> Result<(u64, bool), DbError> {
    if limit == 0 {
        return Err(DbError::ParameterError(
            "page limit must be greater than zero".to_string(),
        ));
    }
    let page_number = offset / limit + 1;
    let is_last_page = page_number.saturating_mul(limit) >= count;
    Ok((page_number, is_last_page))
}

/// Read a `COUNT(*)` result. Missing, NULL or negative counts read as zero.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn count_from_scalar(value: Option<&RowValues>) -> u64 {
    match value {
        Some(RowValues::Int(i)) => u64::try_from(*i).unwrap_or(0),
        Some(RowValues::Text(s)) => s.trim().parse().unwrap_or(0),
        Some(RowValues::Float(f)) if *f > 0.0 => f.trunc() as u64,
        _ => 0,
    }
}
