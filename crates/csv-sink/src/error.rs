//! Error types for CSV serialization.

use export_core::CursorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvExportError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Reading from the store failed.
    #[error("Row source error: {0}")]
    Cursor(#[from] CursorError),

    /// A row does not supply exactly one value per header column.
    #[error("Row {row} has {found} values but the header has {expected} columns")]
    RowShape {
        row: u64,
        expected: usize,
        found: usize,
    },

    /// A row is keyed by a different column list than the header.
    #[error("Row {row} does not match the header columns")]
    ColumnMismatch { row: u64 },
}
