use super::BoxError;
use std::fmt::Write;
use tokio_postgres::types::{FromSql, Type};

const MICROS_PER_HOUR: i64 = 3_600_000_000;
const MICROS_PER_MINUTE: i64 = 60_000_000;
const MICROS_PER_SECOND: i64 = 1_000_000;

/// PostgreSQL INTERVAL value, rendered the way the server prints it with
/// the default `IntervalStyle = postgres` (e.g. `1 year 2 mons -3 days +04:05:06.5`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval(pub String);

impl<'a> FromSql<'a> for Interval {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let raw: &[u8; 16] = raw
            .try_into()
            .map_err(|_| "invalid interval: expected 16 bytes")?;
        let micros = i64::from_be_bytes(raw[0..8].try_into()?);
        let days = i32::from_be_bytes(raw[8..12].try_into()?);
        let months = i32::from_be_bytes(raw[12..16].try_into()?);

        let mut out = String::new();
        // No field printed yet / the last printed field was negative
        let mut is_zero = true;
        let mut is_before = false;

        for (value, unit) in [(months / 12, "year"), (months % 12, "mon"), (days, "day")] {
            if value == 0 {
                continue;
            }
            write!(
                out,
                "{}{}{} {}{}",
                if is_zero { "" } else { " " },
                if is_before && value > 0 { "+" } else { "" },
                value,
                unit,
                if value != 1 { "s" } else { "" }
            )?;
            is_before = value < 0;
            is_zero = false;
        }

        if is_zero || micros != 0 {
            let hours = micros / MICROS_PER_HOUR;
            let minutes = micros % MICROS_PER_HOUR / MICROS_PER_MINUTE;
            let seconds = micros % MICROS_PER_MINUTE / MICROS_PER_SECOND;
            let fraction = micros % MICROS_PER_SECOND;
            let sign = if micros < 0 {
                "-"
            } else if is_before {
                "+"
            } else {
                ""
            };
            write!(
                out,
                "{}{}{:02}:{:02}:{:02}",
                if is_zero { "" } else { " " },
                sign,
                hours.unsigned_abs(),
                minutes.unsigned_abs(),
                seconds.unsigned_abs()
            )?;
            if fraction != 0 {
                let digits = format!("{:06}", fraction.unsigned_abs());
                out.push('.');
                out.push_str(digits.trim_end_matches('0'));
            }
        }

        Ok(Interval(out))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::INTERVAL
    }
}
