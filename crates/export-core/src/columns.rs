//! Column descriptors derived from a query's result description.

use std::fmt;

/// Scalar kind inferred from the store's column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    Boolean,
    Integer,
    Float,
    Numeric,
    Text,
    Timestamp,
    TimestampTz,
    Date,
    Time,
    Uuid,
    Json,
    Binary,
    Array,
    /// A store type with no dedicated mapping; carries the store's type name
    Other(String),
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnKind::Boolean => write!(f, "boolean"),
            ColumnKind::Integer => write!(f, "integer"),
            ColumnKind::Float => write!(f, "float"),
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Text => write!(f, "text"),
            ColumnKind::Timestamp => write!(f, "timestamp"),
            ColumnKind::TimestampTz => write!(f, "timestamptz"),
            ColumnKind::Date => write!(f, "date"),
            ColumnKind::Time => write!(f, "time"),
            ColumnKind::Uuid => write!(f, "uuid"),
            ColumnKind::Json => write!(f, "json"),
            ColumnKind::Binary => write!(f, "binary"),
            ColumnKind::Array => write!(f, "array"),
            ColumnKind::Other(name) => write!(f, "{name}"),
        }
    }
}

/// A single result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Ordered column list for one query execution.
///
/// Built once from the result descriptor, before any row is fetched. The order
/// is the order the descriptor reported and is authoritative for the whole
/// export. Duplicate names are allowed (e.g. `SELECT a.id, b.id`); rows are
/// addressed positionally, names only for lookups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Column names in descriptor order.
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Position of the first column with this name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<T: IntoIterator<Item = Column>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
