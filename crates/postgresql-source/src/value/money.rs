use super::BoxError;
use tokio_postgres::types::{FromSql, Type};

/// PostgreSQL MONEY value as a plain decimal with two fractional digits.
///
/// The server's own text form depends on `lc_monetary` (currency symbol,
/// grouping); the exported field carries only the amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Money(pub String);

impl<'a> FromSql<'a> for Money {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let cents = i64::from_be_bytes(raw.try_into().map_err(|_| "invalid money: expected 8 bytes")?);
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        Ok(Money(format!("{sign}{}.{:02}", abs / 100, abs % 100)))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::MONEY
    }
}
