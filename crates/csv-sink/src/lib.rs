//! CSV serialization for pg-dav-export
//!
//! Consumes a [`export_core::RowStream`] and writes a header plus one line per
//! row, incrementally, as UTF-8 comma-separated text. Fields containing the
//! delimiter, a quote, or a line break are quoted and inner quotes doubled.

mod error;
mod forward;
mod metrics;
mod writer;

pub use error::CsvExportError;
pub use forward::CsvField;
pub use metrics::ExportMetrics;
pub use writer::{export_to_file, CsvSerializer, DEFAULT_BUFFER_SIZE};
