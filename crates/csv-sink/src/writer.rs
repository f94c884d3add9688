//! Streaming CSV writer.

use crate::error::CsvExportError;
use crate::forward::CsvField;
use crate::metrics::ExportMetrics;
use export_core::{ColumnSet, ExportRow, RowCursor, RowStream};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Default buffer size for CSV writing.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Writes a header and validated rows to any byte sink.
///
/// The header fixes the column order for the whole output; every row must
/// carry exactly one value per header column.
pub struct CsvSerializer<W: Write> {
    writer: csv::Writer<W>,
    header: Arc<ColumnSet>,
    rows_written: u64,
}

impl<W: Write> CsvSerializer<W> {
    /// Create a serializer and write the header line immediately.
    pub fn new(sink: W, header: Arc<ColumnSet>) -> Result<Self, CsvExportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .double_quote(true)
            .quote_style(csv::QuoteStyle::Necessary)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(sink);
        writer.write_record(header.names())?;

        Ok(Self {
            writer,
            header,
            rows_written: 0,
        })
    }

    pub fn write_row(&mut self, row: &ExportRow) -> Result<(), CsvExportError> {
        let row_number = self.rows_written + 1;
        if !Arc::ptr_eq(row.columns(), &self.header) && **row.columns() != *self.header {
            return Err(CsvExportError::ColumnMismatch { row: row_number });
        }
        if row.len() != self.header.len() {
            return Err(CsvExportError::RowShape {
                row: row_number,
                expected: self.header.len(),
                found: row.len(),
            });
        }

        self.writer
            .write_record(row.values().iter().map(|v| CsvField::from(v).into_inner()))?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Flush and hand back the sink.
    pub fn finish(self) -> Result<W, CsvExportError> {
        self.writer
            .into_inner()
            .map_err(|e| CsvExportError::Io(std::io::Error::other(e.to_string())))
    }
}

/// Drain `stream` into a CSV file at `output_path`.
///
/// The stream's cursor is closed on every path, success or failure. A failure
/// to close after a successful export is logged, not returned.
pub async fn export_to_file<C: RowCursor>(
    mut stream: RowStream<C>,
    output_path: &Path,
) -> Result<ExportMetrics, CsvExportError> {
    let start_time = Instant::now();

    let result = write_stream(&mut stream, output_path).await;
    let batches_fetched = stream.batches_fetched();

    match stream.close().await {
        Ok(()) => debug!("Row cursor closed"),
        Err(e) => warn!("Failed to close row cursor: {e}"),
    }

    let rows_written = result?;
    let metrics = ExportMetrics {
        rows_written,
        batches_fetched,
        file_size_bytes: std::fs::metadata(output_path)?.len(),
        total_duration: start_time.elapsed(),
    };

    info!(
        "CSV export complete: {} rows, {} bytes in {:?} ({:.2} rows/sec)",
        metrics.rows_written,
        metrics.file_size_bytes,
        metrics.total_duration,
        metrics.rows_per_second()
    );

    Ok(metrics)
}

async fn write_stream<C: RowCursor>(
    stream: &mut RowStream<C>,
    output_path: &Path,
) -> Result<u64, CsvExportError> {
    let header = stream.columns();
    info!(
        "Writing CSV file '{}' with columns {:?}",
        output_path.display(),
        header.names()
    );

    let file = File::create(output_path)?;
    let buf_writer = BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file);
    let mut serializer = CsvSerializer::new(buf_writer, header)?;

    while let Some(row) = stream.next_row().await? {
        serializer.write_row(&row)?;
        if serializer.rows_written() % 10000 == 0 {
            debug!("Written {} rows", serializer.rows_written());
        }
    }

    let rows_written = serializer.rows_written();
    let mut buf_writer = serializer.finish()?;
    buf_writer.flush()?;
    Ok(rows_written)
}
