//! Scalar values and rows.

use crate::columns::ColumnSet;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::sync::Arc;

/// A single cell value read from the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportValue {
    Null,
    Bool(bool),
    Int(i64),
    /// `real`; kept single-precision so it prints without widening noise
    Float32(f32),
    Float(f64),
    /// Arbitrary-precision decimal kept as its canonical text
    Numeric(String),
    Text(String),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Date(NaiveDate),
    Time(NaiveTime),
    Uuid(uuid::Uuid),
    Json(serde_json::Value),
    Bytes(Vec<u8>),
    Array(Vec<ExportValue>),
}

impl ExportValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ExportValue::Null)
    }
}

impl From<&str> for ExportValue {
    fn from(s: &str) -> Self {
        ExportValue::Text(s.to_string())
    }
}

impl From<String> for ExportValue {
    fn from(s: String) -> Self {
        ExportValue::Text(s)
    }
}

impl From<i64> for ExportValue {
    fn from(i: i64) -> Self {
        ExportValue::Int(i)
    }
}

impl<T: Into<ExportValue>> From<Option<T>> for ExportValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(ExportValue::Null)
    }
}

/// One result row, keyed by the shared column list of its query.
///
/// Values are stored in column order. A row is produced per fetch batch and
/// handed straight to the serializer; nothing retains it afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    columns: Arc<ColumnSet>,
    values: Vec<ExportValue>,
}

impl ExportRow {
    /// Build a row. Width is not checked here; the serializer rejects rows
    /// whose width differs from the header.
    pub fn new(columns: Arc<ColumnSet>, values: Vec<ExportValue>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &Arc<ColumnSet> {
        &self.columns
    }

    pub fn values(&self) -> &[ExportValue] {
        &self.values
    }

    pub fn into_values(self) -> Vec<ExportValue> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a value by column name.
    pub fn get(&self, name: &str) -> Option<&ExportValue> {
        self.columns
            .position(name)
            .and_then(|index| self.values.get(index))
    }

    /// Iterate `(column name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExportValue)> {
        self.columns
            .iter()
            .map(|c| c.name.as_str())
            .zip(self.values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::{Column, ColumnKind};

    fn columns() -> Arc<ColumnSet> {
        Arc::new(ColumnSet::new(vec![
            Column::new("id", ColumnKind::Integer),
            Column::new("name", ColumnKind::Text),
        ]))
    }

    #[test]
    fn test_row_lookup_by_name() {
        let row = ExportRow::new(columns(), vec![ExportValue::Int(7), "Ada".into()]);
        assert_eq!(row.get("id"), Some(&ExportValue::Int(7)));
        assert_eq!(row.get("name"), Some(&ExportValue::Text("Ada".to_string())));
        assert_eq!(row.get("email"), None);
    }

    #[test]
    fn test_short_row_lookup_is_none() {
        let row = ExportRow::new(columns(), vec![ExportValue::Int(7)]);
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("name"), None);
    }

    #[test]
    fn test_iter_pairs_in_column_order() {
        let row = ExportRow::new(columns(), vec![ExportValue::Int(1), ExportValue::Null]);
        let pairs: Vec<_> = row.iter().collect();
        assert_eq!(pairs, vec![("id", &ExportValue::Int(1)), ("name", &ExportValue::Null)]);
    }

    #[test]
    fn test_option_into_value() {
        let none: Option<&str> = None;
        assert!(ExportValue::from(none).is_null());
        assert_eq!(ExportValue::from(Some(5i64)), ExportValue::Int(5));
    }
}
