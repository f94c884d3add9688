use super::{be_i16, be_u16, BoxError};
use std::fmt::Write;
use tokio_postgres::types::{FromSql, Type};

const SIGN_POSITIVE: u16 = 0x0000;
const SIGN_NEGATIVE: u16 = 0x4000;
const SIGN_NAN: u16 = 0xC000;
const SIGN_PINF: u16 = 0xD000;
const SIGN_NINF: u16 = 0xF000;
const NBASE: i16 = 10000;

/// PostgreSQL NUMERIC value as its exact text form.
///
/// Decoded straight from the base-10000 wire format, so precision and
/// display scale are unbounded and special values come through as `NaN`,
/// `Infinity` and `-Infinity`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Numeric(pub String);

impl<'a> FromSql<'a> for Numeric {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        if raw.len() < 8 {
            return Err("invalid numeric: header too short".into());
        }
        let ndigits = be_i16(&raw[0..2]);
        let weight = i32::from(be_i16(&raw[2..4]));
        let sign = be_u16(&raw[4..6]);
        let dscale = usize::from(be_u16(&raw[6..8]));

        match sign {
            SIGN_NAN => return Ok(Numeric("NaN".to_string())),
            SIGN_PINF => return Ok(Numeric("Infinity".to_string())),
            SIGN_NINF => return Ok(Numeric("-Infinity".to_string())),
            SIGN_POSITIVE | SIGN_NEGATIVE => {}
            other => return Err(format!("invalid numeric sign 0x{other:04x}").into()),
        }

        let ndigits = usize::try_from(ndigits).map_err(|_| "invalid numeric digit count")?;
        if raw.len() != 8 + 2 * ndigits {
            return Err("invalid numeric: digit count does not match length".into());
        }
        let digits: Vec<i16> = raw[8..].chunks_exact(2).map(be_i16).collect();
        if digits.iter().any(|d| !(0..NBASE).contains(d)) {
            return Err("invalid numeric digit".into());
        }

        // digits[k] carries weight `weight - k`; positions outside the stored
        // digits are zero
        let digit = |k: i32| {
            usize::try_from(k)
                .ok()
                .and_then(|k| digits.get(k))
                .copied()
                .unwrap_or(0)
        };

        let mut out = String::new();
        if sign == SIGN_NEGATIVE && !digits.is_empty() {
            out.push('-');
        }

        if weight < 0 {
            out.push('0');
        } else {
            write!(out, "{}", digit(0))?;
            for k in 1..=weight {
                write!(out, "{:04}", digit(k))?;
            }
        }

        if dscale > 0 {
            let mut fraction = String::with_capacity(dscale + 4);
            let mut k = weight + 1;
            while fraction.len() < dscale {
                write!(fraction, "{:04}", digit(k))?;
                k += 1;
            }
            fraction.truncate(dscale);
            out.push('.');
            out.push_str(&fraction);
        }

        Ok(Numeric(out))
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(weight: i16, sign: u16, dscale: u16, digits: &[i16]) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&(digits.len() as i16).to_be_bytes());
        raw.extend_from_slice(&weight.to_be_bytes());
        raw.extend_from_slice(&sign.to_be_bytes());
        raw.extend_from_slice(&dscale.to_be_bytes());
        for d in digits {
            raw.extend_from_slice(&d.to_be_bytes());
        }
        raw
    }

    fn decode(raw: &[u8]) -> String {
        Numeric::from_sql(&Type::NUMERIC, raw).unwrap().0
    }

    #[test]
    fn test_beyond_96_bit_range() {
        // 10^32
        let text = decode(&encode(8, SIGN_POSITIVE, 0, &[1]));
        assert_eq!(text, format!("1{}", "0".repeat(32)));
    }

    #[test]
    fn test_long_fraction_is_not_rounded() {
        // 0.12345678901234567890123456789012
        let raw = encode(
            -1,
            SIGN_POSITIVE,
            32,
            &[1234, 5678, 9012, 3456, 7890, 1234, 5678, 9012],
        );
        assert_eq!(decode(&raw), "0.12345678901234567890123456789012");
    }

    #[test]
    fn test_special_values() {
        assert_eq!(decode(&encode(0, SIGN_NAN, 0, &[])), "NaN");
        assert_eq!(decode(&encode(0, SIGN_PINF, 0, &[])), "Infinity");
        assert_eq!(decode(&encode(0, SIGN_NINF, 0, &[])), "-Infinity");
    }

    #[test]
    fn test_scale_and_sign() {
        // -1234567.8900
        assert_eq!(
            decode(&encode(1, SIGN_NEGATIVE, 4, &[123, 4567, 8900])),
            "-1234567.8900"
        );
        // 0.0001234
        assert_eq!(decode(&encode(-1, SIGN_POSITIVE, 7, &[1, 2340])), "0.0001234");
        // 12.00 with trailing zero groups stripped on the wire
        assert_eq!(decode(&encode(0, SIGN_POSITIVE, 2, &[12])), "12.00");
        assert_eq!(decode(&encode(0, SIGN_POSITIVE, 0, &[])), "0");
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        assert!(Numeric::from_sql(&Type::NUMERIC, &[0, 1]).is_err());
        let mut raw = encode(0, SIGN_POSITIVE, 0, &[1]);
        raw.pop();
        assert!(Numeric::from_sql(&Type::NUMERIC, &raw).is_err());
        assert!(Numeric::from_sql(&Type::NUMERIC, &encode(0, SIGN_POSITIVE, 0, &[10000])).is_err());
    }
}
