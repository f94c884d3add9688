//! PostgreSQL row source for pg-dav-export
//!
//! Executes a query through a named server-side cursor and exposes it as an
//! [`export_core::RowCursor`], so rows are pulled in bounded batches instead
//! of materializing the whole result set.

mod cursor;
mod error;
mod value;

pub use cursor::{normalize_query, PgConnectOpts, PostgresCursor, CURSOR_NAME};
pub use error::PostgresSourceError;
pub use value::{column_kind, convert_row};
