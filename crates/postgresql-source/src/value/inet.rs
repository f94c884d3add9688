use super::BoxError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tokio_postgres::types::{FromSql, Type};

const PGSQL_AF_INET: u8 = 2;
const PGSQL_AF_INET6: u8 = 3;

/// PostgreSQL INET or CIDR value in its text form (`10.0.0.1`,
/// `10.0.0.0/8`, `2001:db8::/32`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inet(pub String);

impl<'a> FromSql<'a> for Inet {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let [family, bits, is_cidr, length, address @ ..] = raw else {
            return Err("invalid inet: header too short".into());
        };
        if address.len() != usize::from(*length) {
            return Err("invalid inet: address length mismatch".into());
        }

        let (ip, max_bits) = match *family {
            PGSQL_AF_INET => {
                let octets: [u8; 4] = address.try_into()?;
                (IpAddr::V4(Ipv4Addr::from(octets)), 32)
            }
            PGSQL_AF_INET6 => {
                let octets: [u8; 16] = address.try_into()?;
                (IpAddr::V6(Ipv6Addr::from(octets)), 128)
            }
            other => return Err(format!("invalid inet family {other}").into()),
        };

        // A host address with a full mask prints without the prefix length
        let text = if *is_cidr == 0 && *bits == max_bits {
            ip.to_string()
        } else {
            format!("{ip}/{bits}")
        };
        Ok(Inet(text))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(*ty, Type::INET | Type::CIDR)
    }
}
