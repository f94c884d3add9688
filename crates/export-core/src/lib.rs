//! Core types for pg-dav-export
//!
//! This crate holds the pieces shared by every stage of the export pipeline:
//!
//! - [`ColumnSet`] - the column list discovered from a live result descriptor
//! - [`ExportValue`] / [`ExportRow`] - scalar values and rows keyed by that list
//! - [`RowSource`] / [`RowCursor`] - the seam between a data store and the pipeline
//! - [`RowStream`] - a lazy row sequence that never buffers more than one batch
//!
//! # Example
//!
//! ```ignore
//! use export_core::RowStream;
//!
//! let mut stream = RowStream::new(cursor, 1000);
//! let columns = stream.columns();
//! while let Some(row) = stream.next_row().await? {
//!     // write row...
//! }
//! stream.close().await?;
//! ```

pub mod columns;
pub mod error;
pub mod stream;
pub mod values;

pub use columns::{Column, ColumnKind, ColumnSet};
pub use error::CursorError;
pub use stream::{RowCursor, RowSource, RowStream, DEFAULT_FETCH_SIZE};
pub use values::{ExportRow, ExportValue};
