use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use mysql::consts::ColumnType;
use mysql::{Column, Row, Value};

use crate::error::DbError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Character set id MySQL reports for binary strings and blobs.
const BINARY_CHARSET: u16 = 63;

pub(crate) fn mysql_error(err: &mysql::Error) -> DbError {
    DbError::ExecutionError(err.to_string())
}

fn is_integer_type(column_type: ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::MYSQL_TYPE_TINY
            | ColumnType::MYSQL_TYPE_SHORT
            | ColumnType::MYSQL_TYPE_LONG
            | ColumnType::MYSQL_TYPE_INT24
            | ColumnType::MYSQL_TYPE_LONGLONG
            | ColumnType::MYSQL_TYPE_YEAR
    )
}

fn is_float_type(column_type: ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE
    )
}

fn is_datetime_type(column_type: ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::MYSQL_TYPE_DATE
            | ColumnType::MYSQL_TYPE_NEWDATE
            | ColumnType::MYSQL_TYPE_DATETIME
            | ColumnType::MYSQL_TYPE_DATETIME2
            | ColumnType::MYSQL_TYPE_TIMESTAMP
            | ColumnType::MYSQL_TYPE_TIMESTAMP2
    )
}

/// Parse the text form of DATE / DATETIME / TIMESTAMP. Zero dates do not parse.
pub(crate) fn parse_mysql_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Decode a text-protocol (or binary-protocol string) value by its column type.
///
/// DECIMAL stays text so no precision is lost.
pub(crate) fn decode_bytes(bytes: &[u8], column_type: ColumnType, charset: u16) -> RowValues {
    let text = std::str::from_utf8(bytes);
    if let Ok(text) = text {
        if is_integer_type(column_type) {
            if let Ok(i) = text.parse::<i64>() {
                return RowValues::Int(i);
            }
        } else if is_float_type(column_type) {
            if let Ok(f) = text.parse::<f64>() {
                return RowValues::Float(f);
            }
        } else if is_datetime_type(column_type) {
            if let Some(dt) = parse_mysql_datetime(text) {
                return RowValues::Timestamp(dt);
            }
        }
    }

    match text {
        Ok(text) if charset != BINARY_CHARSET || renders_as_text(column_type) => {
            RowValues::Text(text.to_string())
        }
        _ => RowValues::Blob(bytes.to_vec()),
    }
}

/// Types MySQL tags with the binary charset even though they render as text.
fn renders_as_text(column_type: ColumnType) -> bool {
    is_integer_type(column_type)
        || is_float_type(column_type)
        || is_datetime_type(column_type)
        || matches!(
            column_type,
            ColumnType::MYSQL_TYPE_DECIMAL
                | ColumnType::MYSQL_TYPE_NEWDECIMAL
                | ColumnType::MYSQL_TYPE_TIME
                | ColumnType::MYSQL_TYPE_TIME2
                | ColumnType::MYSQL_TYPE_JSON
                | ColumnType::MYSQL_TYPE_NULL
        )
}

/// Convert one mysql value into `RowValues`.
#[must_use]
pub fn mysql_value_to_row_value(value: &Value, column_type: ColumnType, charset: u16) -> RowValues {
    match value {
        Value::NULL => RowValues::Null,
        Value::Bytes(bytes) => decode_bytes(bytes, column_type, charset),
        Value::Int(i) => RowValues::Int(*i),
        Value::UInt(u) => i64::try_from(*u).map_or_else(|_| RowValues::Text(u.to_string()), RowValues::Int),
        Value::Float(f) => RowValues::Float(f64::from(*f)),
        Value::Double(d) => RowValues::Float(*d),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            NaiveDate::from_ymd_opt(i32::from(*year), u32::from(*month), u32::from(*day))
                .and_then(|d| {
                    d.and_hms_micro_opt(
                        u32::from(*hour),
                        u32::from(*minute),
                        u32::from(*second),
                        *micros,
                    )
                })
                .map_or_else(
                    || {
                        RowValues::Text(format!(
                            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
                        ))
                    },
                    RowValues::Timestamp,
                )
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if *negative { "-" } else { "" };
            let total_hours = u64::from(*days) * 24 + u64::from(*hours);
            let mut text = format!("{sign}{total_hours:02}:{minutes:02}:{seconds:02}");
            if *micros > 0 {
                text.push_str(&format!(".{micros:06}"));
            }
            RowValues::Text(text)
        }
    }
}

/// Collect the rows of one MySQL result.
///
/// # Errors
///
/// Returns `DbError::ExecutionError` if the driver fails while streaming rows.
pub fn build_result_set<I>(
    columns: &[Column],
    rows: I,
    rows_affected: u64,
    last_insert_id: Option<u64>,
) -> Result<ResultSet, DbError>
where
    I: Iterator<Item = mysql::Result<Row>>,
{
    let last_insert_id = last_insert_id.filter(|id| *id > 0);
    if columns.is_empty() {
        return Ok(ResultSet::affected(rows_affected, last_insert_id));
    }

    let column_names: Vec<String> = columns.iter().map(|c| c.name_str().into_owned()).collect();
    let decoders: Vec<(ColumnType, u16)> = columns
        .iter()
        .map(|c| (c.column_type(), c.character_set()))
        .collect();

    let mut result_set = ResultSet::with_capacity(10);
    result_set.rows_affected = rows_affected;
    result_set.last_insert_id = last_insert_id;
    result_set.set_column_names(Arc::new(column_names));

    for row in rows {
        let row = row.map_err(|e| mysql_error(&e))?;
        let row_values = decoders
            .iter()
            .enumerate()
            .map(|(i, (column_type, charset))| {
                row.as_ref(i).map_or(RowValues::Null, |v| {
                    mysql_value_to_row_value(v, *column_type, *charset)
                })
            })
            .collect();
        result_set.add_row_values(row_values);
    }

    Ok(result_set)
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTF8: u16 = 33;

    #[test]
    fn text_protocol_numbers_are_typed() {
        assert_eq!(
            decode_bytes(b"42", ColumnType::MYSQL_TYPE_LONGLONG, BINARY_CHARSET),
            RowValues::Int(42)
        );
        assert_eq!(
            decode_bytes(b"2.5", ColumnType::MYSQL_TYPE_DOUBLE, BINARY_CHARSET),
            RowValues::Float(2.5)
        );
        assert_eq!(
            decode_bytes(b"10.10", ColumnType::MYSQL_TYPE_NEWDECIMAL, BINARY_CHARSET),
            RowValues::Text("10.10".into())
        );
    }

    #[test]
    fn json_columns_are_text() {
        assert_eq!(
            decode_bytes(br#"{"a": 1}"#, ColumnType::MYSQL_TYPE_JSON, BINARY_CHARSET),
            RowValues::Text(r#"{"a": 1}"#.into())
        );
    }

    #[test]
    fn strings_and_blobs_split_on_charset() {
        assert_eq!(
            decode_bytes(b"bob", ColumnType::MYSQL_TYPE_VAR_STRING, UTF8),
            RowValues::Text("bob".into())
        );
        assert_eq!(
            decode_bytes(b"bob", ColumnType::MYSQL_TYPE_BLOB, BINARY_CHARSET),
            RowValues::Blob(b"bob".to_vec())
        );
        assert_eq!(
            decode_bytes(&[0xff, 0xfe], ColumnType::MYSQL_TYPE_VAR_STRING, UTF8),
            RowValues::Blob(vec![0xff, 0xfe])
        );
    }

    #[test]
    fn datetimes_parse_and_zero_dates_stay_text() {
        let v = decode_bytes(
            b"2024-05-06 07:08:09",
            ColumnType::MYSQL_TYPE_DATETIME,
            BINARY_CHARSET,
        );
        assert_eq!(
            v.as_timestamp().map(|d| d.to_string()),
            Some("2024-05-06 07:08:09".to_string())
        );
        assert_eq!(
            decode_bytes(
                b"0000-00-00 00:00:00",
                ColumnType::MYSQL_TYPE_DATETIME,
                BINARY_CHARSET
            ),
            RowValues::Text("0000-00-00 00:00:00".into())
        );
    }

    #[test]
    fn binary_protocol_values() {
        let any = ColumnType::MYSQL_TYPE_LONGLONG;
        assert_eq!(mysql_value_to_row_value(&Value::NULL, any, UTF8), RowValues::Null);
        assert_eq!(
            mysql_value_to_row_value(&Value::UInt(u64::MAX), any, UTF8),
            RowValues::Text(u64::MAX.to_string())
        );
        assert_eq!(
            mysql_value_to_row_value(&Value::Time(true, 1, 2, 3, 4, 0), any, UTF8),
            RowValues::Text("-26:03:04".into())
        );
        let date = mysql_value_to_row_value(&Value::Date(2023, 12, 31, 23, 59, 58, 0), any, UTF8);
        assert!(matches!(date, RowValues::Timestamp(_)));
    }
}
