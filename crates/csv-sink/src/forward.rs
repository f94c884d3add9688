//! Forward conversion: ExportValue → CSV field text.

use base64::Engine;
use export_core::ExportValue;

/// Wrapper for CSV field text.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvField(pub String);

impl CsvField {
    /// Get the inner CSV string.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Get a reference to the inner CSV string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&ExportValue> for CsvField {
    fn from(value: &ExportValue) -> Self {
        match value {
            // Null - empty field
            ExportValue::Null => CsvField(String::new()),

            ExportValue::Bool(b) => CsvField(if *b { "true" } else { "false" }.to_string()),
            ExportValue::Int(i) => CsvField(i.to_string()),
            ExportValue::Float32(f) => CsvField(f.to_string()),
            ExportValue::Float(f) => CsvField(f.to_string()),

            // Exact decimal text, preserved as-is
            ExportValue::Numeric(n) => CsvField(n.clone()),
            ExportValue::Text(s) => CsvField(s.clone()),

            // Date/time types - PostgreSQL text style
            ExportValue::Timestamp(ts) => CsvField(ts.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            ExportValue::TimestampTz(ts) => {
                CsvField(ts.format("%Y-%m-%d %H:%M:%S%.f%:z").to_string())
            }
            ExportValue::Date(d) => CsvField(d.format("%Y-%m-%d").to_string()),
            ExportValue::Time(t) => CsvField(t.format("%H:%M:%S%.f").to_string()),

            ExportValue::Uuid(u) => CsvField(u.to_string()),

            // JSON - compact serialization
            ExportValue::Json(json) => CsvField(json.to_string()),

            // Binary - base64 encode
            ExportValue::Bytes(b) => {
                CsvField(base64::engine::general_purpose::STANDARD.encode(b))
            }

            // Arrays - serialize as JSON array
            ExportValue::Array(elements) => {
                let json: Vec<serde_json::Value> = elements.iter().map(value_to_json).collect();
                CsvField(serde_json::Value::Array(json).to_string())
            }
        }
    }
}

/// Convert an ExportValue to JSON for array rendering.
fn value_to_json(value: &ExportValue) -> serde_json::Value {
    match value {
        ExportValue::Null => serde_json::Value::Null,
        ExportValue::Bool(b) => serde_json::json!(*b),
        ExportValue::Int(i) => serde_json::json!(*i),
        // Parse the f32's own shortest text so JSON does not show the f64 widening
        ExportValue::Float32(f) => f
            .to_string()
            .parse::<serde_json::Number>()
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ExportValue::Float(f) => serde_json::json!(*f),
        ExportValue::Json(json) => json.clone(),
        ExportValue::Array(elements) => {
            serde_json::Value::Array(elements.iter().map(value_to_json).collect())
        }
        other => serde_json::Value::String(CsvField::from(other).into_inner()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn field(value: ExportValue) -> String {
        CsvField::from(&value).into_inner()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(field(ExportValue::Null), "");
        assert_eq!(field(ExportValue::Bool(true)), "true");
        assert_eq!(field(ExportValue::Int(-42)), "-42");
        assert_eq!(field(ExportValue::Float(1.5)), "1.5");
        assert_eq!(field(ExportValue::Numeric("12.3400".to_string())), "12.3400");
    }

    #[test]
    fn test_real_prints_single_precision() {
        assert_eq!(field(ExportValue::Float32(0.1)), "0.1");
        assert_eq!(field(ExportValue::Float32(-2.5)), "-2.5");
        assert_eq!(
            field(ExportValue::Array(vec![
                ExportValue::Float32(0.1),
                ExportValue::Float32(f32::NAN),
            ])),
            "[0.1,null]"
        );
    }

    #[test]
    fn test_temporal() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let ts = date.and_hms_micro_opt(7, 5, 1, 250_000).unwrap();
        assert_eq!(field(ExportValue::Date(date)), "2024-03-09");
        assert_eq!(field(ExportValue::Timestamp(ts)), "2024-03-09 07:05:01.250");
        assert_eq!(
            field(ExportValue::Timestamp(date.and_hms_opt(0, 0, 0).unwrap())),
            "2024-03-09 00:00:00"
        );

        let tz = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(field(ExportValue::TimestampTz(tz)), "2024-03-09 07:05:01+00:00");
    }

    #[test]
    fn test_binary_is_base64() {
        assert_eq!(field(ExportValue::Bytes(b"hello".to_vec())), "aGVsbG8=");
    }

    #[test]
    fn test_json_and_arrays() {
        assert_eq!(
            field(ExportValue::Json(serde_json::json!({"a": [1, 2]}))),
            r#"{"a":[1,2]}"#
        );
        assert_eq!(
            field(ExportValue::Array(vec![
                ExportValue::Int(1),
                ExportValue::Null,
                ExportValue::Text("x".to_string()),
            ])),
            r#"[1,null,"x"]"#
        );
    }
}
