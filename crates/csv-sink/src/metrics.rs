//! Export metrics.

use std::time::Duration;

/// Metrics from an export run.
#[derive(Debug, Clone, Default)]
pub struct ExportMetrics {
    /// Number of data rows written (header excluded).
    pub rows_written: u64,
    /// Number of non-empty batches fetched from the store.
    pub batches_fetched: u64,
    /// Output file size in bytes.
    pub file_size_bytes: u64,
    /// Total time taken.
    pub total_duration: Duration,
}

impl ExportMetrics {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_written as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_per_second() {
        let metrics = ExportMetrics {
            rows_written: 1000,
            batches_fetched: 1,
            file_size_bytes: 100_000,
            total_duration: Duration::from_secs(10),
        };
        assert_eq!(metrics.rows_per_second(), 100.0);
        assert_eq!(ExportMetrics::default().rows_per_second(), 0.0);
    }
}
