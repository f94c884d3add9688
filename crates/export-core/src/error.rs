//! Error types for row cursors and streams.

use thiserror::Error;

/// Errors raised while reading rows from a store.
#[derive(Error, Debug)]
pub enum CursorError {
    /// Connection, query, or protocol failure reported by the store.
    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A value could not be converted to an [`crate::ExportValue`].
    #[error("column '{column}': {message}")]
    Conversion { column: String, message: String },

    /// A cursor returned more rows than the stream asked for.
    #[error("cursor returned {received} rows for a fetch of at most {requested}")]
    BatchOverflow { requested: usize, received: usize },

    /// The cursor was used after being closed.
    #[error("cursor is closed")]
    Closed,
}

impl CursorError {
    pub fn store(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        CursorError::Store(err.into())
    }
}
