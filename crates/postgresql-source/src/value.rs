//! PostgreSQL value conversion
//!
//! Maps PostgreSQL column types to [`ColumnKind`] and decodes row values into
//! [`ExportValue`].

mod inet;
mod interval;
mod label;
mod money;
mod numeric;

pub use inet::Inet;
pub use interval::Interval;
pub use label::EnumLabel;
pub use money::Money;
pub use numeric::Numeric;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use export_core::{Column, ColumnKind, ColumnSet, CursorError, ExportRow, ExportValue};
use std::sync::Arc;
use tokio_postgres::types::{FromSql, Kind, Type};
use tokio_postgres::Row;

pub(crate) type BoxError = Box<dyn std::error::Error + Sync + Send>;

/// Callers pass exactly two bytes.
fn be_i16(bytes: &[u8]) -> i16 {
    i16::from_be_bytes([bytes[0], bytes[1]])
}

fn be_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

/// Infer the scalar kind of a PostgreSQL column type.
pub fn column_kind(pg_type: &Type) -> ColumnKind {
    match *pg_type {
        Type::BOOL => ColumnKind::Boolean,
        Type::INT2 | Type::INT4 | Type::INT8 | Type::OID => ColumnKind::Integer,
        Type::FLOAT4 | Type::FLOAT8 => ColumnKind::Float,
        Type::NUMERIC => ColumnKind::Numeric,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::CHAR => ColumnKind::Text,
        Type::TIMESTAMP => ColumnKind::Timestamp,
        Type::TIMESTAMPTZ => ColumnKind::TimestampTz,
        Type::DATE => ColumnKind::Date,
        Type::TIME => ColumnKind::Time,
        Type::UUID => ColumnKind::Uuid,
        Type::JSON | Type::JSONB => ColumnKind::Json,
        Type::BYTEA => ColumnKind::Binary,
        _ => match pg_type.kind() {
            Kind::Enum(_) => ColumnKind::Text,
            Kind::Array(_) => ColumnKind::Array,
            _ => ColumnKind::Other(pg_type.name().to_string()),
        },
    }
}

/// Build the column set from a prepared statement's result columns.
pub(crate) fn columns_from_descriptor(columns: &[tokio_postgres::Column]) -> ColumnSet {
    columns
        .iter()
        .map(|c| Column::new(c.name(), column_kind(c.type_())))
        .collect()
}

/// Convert a fetched row into an [`ExportRow`] keyed by `columns`.
pub fn convert_row(row: &Row, columns: &Arc<ColumnSet>) -> Result<ExportRow, CursorError> {
    let mut values = Vec::with_capacity(row.len());
    for index in 0..row.len() {
        values.push(convert_postgres_value(row, index)?);
    }
    Ok(ExportRow::new(Arc::clone(columns), values))
}

fn get<'a, T: FromSql<'a>>(row: &'a Row, index: usize) -> Result<Option<T>, CursorError> {
    row.try_get::<_, Option<T>>(index)
        .map_err(|e| conversion_error(row, index, e.to_string()))
}

fn conversion_error(row: &Row, index: usize, message: String) -> CursorError {
    CursorError::Conversion {
        column: row.columns()[index].name().to_string(),
        message,
    }
}

fn array<'a, T, F>(row: &'a Row, index: usize, f: F) -> Result<ExportValue, CursorError>
where
    T: FromSql<'a>,
    F: Fn(T) -> ExportValue,
{
    Ok(match get::<Vec<Option<T>>>(row, index)? {
        Some(items) => ExportValue::Array(items.into_iter().map(|v| v.map(&f).into()).collect()),
        None => ExportValue::Null,
    })
}

/// Convert a PostgreSQL value to an [`ExportValue`]
///
/// Domain columns need no case of their own: the server describes them by
/// their base type.
fn convert_postgres_value(row: &Row, index: usize) -> Result<ExportValue, CursorError> {
    let pg_type = row.columns()[index].type_();

    let value = match *pg_type {
        Type::BOOL => get::<bool>(row, index)?.map(ExportValue::Bool),
        Type::INT2 => get::<i16>(row, index)?.map(|i| ExportValue::Int(i as i64)),
        Type::INT4 => get::<i32>(row, index)?.map(|i| ExportValue::Int(i as i64)),
        Type::INT8 => get::<i64>(row, index)?.map(ExportValue::Int),
        Type::OID => get::<u32>(row, index)?.map(|i| ExportValue::Int(i as i64)),
        Type::FLOAT4 => get::<f32>(row, index)?.map(ExportValue::Float32),
        Type::FLOAT8 => get::<f64>(row, index)?.map(ExportValue::Float),
        Type::NUMERIC => get::<Numeric>(row, index)?.map(|n| ExportValue::Numeric(n.0)),
        Type::MONEY => get::<Money>(row, index)?.map(|m| ExportValue::Numeric(m.0)),
        Type::CHAR => get::<i8>(row, index)?.map(|c| ExportValue::Text((c as u8 as char).to_string())),
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
            get::<String>(row, index)?.map(ExportValue::Text)
        }
        Type::TIMESTAMP => get::<NaiveDateTime>(row, index)?.map(ExportValue::Timestamp),
        Type::TIMESTAMPTZ => get::<DateTime<Utc>>(row, index)?.map(ExportValue::TimestampTz),
        Type::DATE => get::<NaiveDate>(row, index)?.map(ExportValue::Date),
        Type::TIME => get::<NaiveTime>(row, index)?.map(ExportValue::Time),
        Type::INTERVAL => get::<Interval>(row, index)?.map(|i| ExportValue::Text(i.0)),
        Type::INET | Type::CIDR => get::<Inet>(row, index)?.map(|i| ExportValue::Text(i.0)),
        Type::UUID => get::<uuid::Uuid>(row, index)?.map(ExportValue::Uuid),
        Type::JSON | Type::JSONB => get::<serde_json::Value>(row, index)?.map(ExportValue::Json),
        Type::BYTEA => get::<Vec<u8>>(row, index)?.map(ExportValue::Bytes),
        Type::BOOL_ARRAY => return array::<bool, _>(row, index, ExportValue::Bool),
        Type::INT2_ARRAY => return array::<i16, _>(row, index, |i| ExportValue::Int(i as i64)),
        Type::INT4_ARRAY => return array::<i32, _>(row, index, |i| ExportValue::Int(i as i64)),
        Type::INT8_ARRAY => return array::<i64, _>(row, index, ExportValue::Int),
        Type::FLOAT4_ARRAY => return array::<f32, _>(row, index, ExportValue::Float32),
        Type::FLOAT8_ARRAY => return array::<f64, _>(row, index, ExportValue::Float),
        Type::NUMERIC_ARRAY => {
            return array::<Numeric, _>(row, index, |n| ExportValue::Numeric(n.0))
        }
        Type::TIMESTAMP_ARRAY => {
            return array::<NaiveDateTime, _>(row, index, ExportValue::Timestamp)
        }
        Type::TIMESTAMPTZ_ARRAY => {
            return array::<DateTime<Utc>, _>(row, index, ExportValue::TimestampTz)
        }
        Type::DATE_ARRAY => return array::<NaiveDate, _>(row, index, ExportValue::Date),
        Type::TIME_ARRAY => return array::<NaiveTime, _>(row, index, ExportValue::Time),
        Type::INTERVAL_ARRAY => {
            return array::<Interval, _>(row, index, |i| ExportValue::Text(i.0))
        }
        Type::INET_ARRAY | Type::CIDR_ARRAY => {
            return array::<Inet, _>(row, index, |i| ExportValue::Text(i.0))
        }
        Type::UUID_ARRAY => return array::<uuid::Uuid, _>(row, index, ExportValue::Uuid),
        Type::JSON_ARRAY | Type::JSONB_ARRAY => {
            return array::<serde_json::Value, _>(row, index, ExportValue::Json)
        }
        Type::BYTEA_ARRAY => return array::<Vec<u8>, _>(row, index, ExportValue::Bytes),
        _ => match pg_type.kind() {
            Kind::Enum(_) => get::<EnumLabel>(row, index)?.map(|l| ExportValue::Text(l.0)),
            Kind::Array(member) if EnumLabel::accepts(member) => {
                return array::<EnumLabel, _>(row, index, |l| ExportValue::Text(l.0))
            }
            // Text-like arrays (text[], varchar[], bpchar[], citext[], ...)
            Kind::Array(member) if <String as FromSql>::accepts(member) => {
                return array::<String, _>(row, index, ExportValue::Text)
            }
            // Text-like extension types (citext, ltree, ...) decode as String
            _ if <String as FromSql>::accepts(pg_type) => {
                get::<String>(row, index)?.map(ExportValue::Text)
            }
            _ => {
                return Err(conversion_error(
                    row,
                    index,
                    format!(
                        "unsupported PostgreSQL type '{}'; cast the column to text in the query (e.g. col::text)",
                        pg_type.name()
                    ),
                ));
            }
        },
    };

    Ok(value.unwrap_or(ExportValue::Null))
}
