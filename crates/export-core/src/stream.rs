//! Batch-bounded row streaming over a store cursor.

use crate::columns::ColumnSet;
use crate::error::CursorError;
use crate::values::ExportRow;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

/// Default number of rows requested per fetch.
pub const DEFAULT_FETCH_SIZE: usize = 1000;

/// A server-side cursor over an executed query.
///
/// Implementations must know their columns as soon as they exist (i.e. right
/// after the query is executed) so a header can be written before the first
/// row is fetched.
#[async_trait]
pub trait RowCursor: Send {
    /// Columns of the result, in descriptor order.
    fn columns(&self) -> Arc<ColumnSet>;

    /// Fetch the next batch of at most `max_rows` rows.
    ///
    /// An empty batch means the result is exhausted.
    async fn fetch(&mut self, max_rows: usize) -> Result<Vec<ExportRow>, CursorError>;

    /// Release the cursor and its connection. Must be safe to call after a
    /// failed fetch and more than once.
    async fn close(&mut self) -> Result<(), CursorError>;
}

/// Something that can execute a query and hand back a [`RowCursor`].
///
/// Opening must not fetch any rows.
#[async_trait]
pub trait RowSource: Sync {
    type Cursor: RowCursor;

    async fn open(&self, query: &str) -> Result<Self::Cursor, CursorError>;
}

/// Lazy, finite, non-restartable row sequence.
///
/// Holds at most one fetched batch at a time; the next batch is requested
/// only once the previous one has been fully consumed.
pub struct RowStream<C: RowCursor> {
    cursor: C,
    columns: Arc<ColumnSet>,
    fetch_size: usize,
    buffer: VecDeque<ExportRow>,
    exhausted: bool,
    batches_fetched: u64,
    rows_delivered: u64,
}

impl<C: RowCursor> RowStream<C> {
    pub fn new(cursor: C, fetch_size: usize) -> Self {
        let columns = cursor.columns();
        Self {
            cursor,
            columns,
            fetch_size: fetch_size.max(1),
            buffer: VecDeque::new(),
            exhausted: false,
            batches_fetched: 0,
            rows_delivered: 0,
        }
    }

    pub fn columns(&self) -> Arc<ColumnSet> {
        Arc::clone(&self.columns)
    }

    /// Next row in store order, or `None` once the cursor is drained.
    pub async fn next_row(&mut self) -> Result<Option<ExportRow>, CursorError> {
        if self.buffer.is_empty() && !self.exhausted {
            let batch = self.cursor.fetch(self.fetch_size).await?;
            if batch.len() > self.fetch_size {
                return Err(CursorError::BatchOverflow {
                    requested: self.fetch_size,
                    received: batch.len(),
                });
            }
            if batch.is_empty() {
                self.exhausted = true;
            } else {
                self.batches_fetched += 1;
                debug!(
                    "Fetched batch {} with {} rows",
                    self.batches_fetched,
                    batch.len()
                );
                self.buffer.extend(batch);
            }
        }

        let row = self.buffer.pop_front();
        if row.is_some() {
            self.rows_delivered += 1;
        }
        Ok(row)
    }

    /// Rows fetched from the store but not yet handed out.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn batches_fetched(&self) -> u64 {
        self.batches_fetched
    }

    pub fn rows_delivered(&self) -> u64 {
        self.rows_delivered
    }

    /// Close the underlying cursor, discarding anything still buffered.
    pub async fn close(mut self) -> Result<(), CursorError> {
        self.buffer.clear();
        self.cursor.close().await
    }
}
