//! Command-line entry point for pg-dav-export
//!
//! ```bash
//! YANDEX_DISK_TOKEN=... pg-dav-export \
//!   --pg-host db.internal --pg-user analyst --pg-database sales \
//!   --query "SELECT id, email FROM users" \
//!   --remote-dir Backups/sql_results
//! ```
//!
//! Exit codes: 0 success, 1 missing or invalid configuration, 2 upload
//! rejected by the WebDAV server, 3 any other failure.

use clap::Parser;
use pg_dav_export::{run, usage_exit_code, Cli, ExportError};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(usage_exit_code(&e));
        }
    };

    match run(cli, |name| std::env::var(name).ok(), |config| config.pg.clone()).await {
        Ok(report) => {
            println!("Upload completed: {}", report.remote_name);
        }
        Err(e) => {
            match &e {
                ExportError::UploadRejected { status, body, .. } => {
                    eprintln!("Upload failed: {status}");
                    eprintln!("{body}");
                }
                other => eprintln!("Error: {other}"),
            }
            std::process::exit(e.exit_code());
        }
    }
}
