//! pg-dav-export
//!
//! Runs one SQL query against PostgreSQL, streams the result into a local CSV
//! file through a server-side cursor, and publishes that file to a WebDAV
//! store (Yandex Disk by default).
//!
//! # Pipeline
//!
//! - `pg_dav_export_postgresql` - query execution with bounded batch fetches
//! - `pg_dav_export_csv` - header plus one quoted-when-needed line per row
//! - `pg_dav_export_webdav` - MKCOL for every ancestor directory, then a streamed PUT
//!
//! # CLI Usage
//!
//! ```bash
//! export YANDEX_DISK_TOKEN=...
//! pg-dav-export \
//!   --pg-user analyst --pg-database sales \
//!   --query "SELECT * FROM users WHERE created_at > now() - interval '7 days'" \
//!   --remote-dir Backups/sql_results \
//!   --remote-name users_last7days.csv
//! ```

pub mod artifact;
pub mod config;
pub mod error;
pub mod pipeline;

pub use artifact::LocalArtifact;
pub use config::{default_remote_name, Cli, ExportConfig};
pub use error::{
    usage_exit_code, ConfigError, ExportError, EXIT_FATAL, EXIT_PRECONDITION, EXIT_UPLOAD_FAILED,
};
pub use pipeline::{ExportReport, Exporter, Stage};

use chrono::Utc;
use export_core::RowSource;

/// Resolve configuration and run one export.
///
/// `make_source` is only called once configuration has been validated, so a
/// precondition failure never reaches the data store.
pub async fn run<S, F>(
    cli: Cli,
    env: impl Fn(&str) -> Option<String>,
    make_source: F,
) -> Result<ExportReport, ExportError>
where
    S: RowSource,
    F: FnOnce(&ExportConfig) -> S,
{
    let config = ExportConfig::resolve(cli, env, Utc::now())?;
    let source = make_source(&config);
    let mut exporter = Exporter::new(config, source)?;
    exporter.run().await
}
