use super::BoxError;
use tokio_postgres::types::{FromSql, Kind, Type};

/// Label of a user-defined enum value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumLabel(pub String);

impl<'a> FromSql<'a> for EnumLabel {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Ok(EnumLabel(std::str::from_utf8(raw)?.to_string()))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mood() -> Type {
        Type::new(
            "mood".to_string(),
            90001,
            Kind::Enum(vec!["sad".to_string(), "happy".to_string()]),
            "public".to_string(),
        )
    }

    #[test]
    fn test_enum_label_decodes_utf8() {
        let label = EnumLabel::from_sql(&mood(), "happy".as_bytes()).unwrap();
        assert_eq!(label.0, "happy");
        assert!(EnumLabel::from_sql(&mood(), &[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_enum_label_accepts_only_enums() {
        assert!(EnumLabel::accepts(&mood()));
        assert!(!EnumLabel::accepts(&Type::TEXT));

        let moods = Type::new(
            "_mood".to_string(),
            90002,
            Kind::Array(mood()),
            "public".to_string(),
        );
        assert!(<Vec<Option<EnumLabel>> as FromSql>::accepts(&moods));
    }
}
