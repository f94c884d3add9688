//! Error types and exit-code mapping.

use export_core::CursorError;
use pg_dav_export_csv::CsvExportError;
use pg_dav_export_webdav::{StatusCode, Url, WebDavError};
use thiserror::Error;

/// Exit code for a missing or invalid configuration value or credential.
pub const EXIT_PRECONDITION: i32 = 1;
/// Exit code for an upload the server answered with a non-2xx status.
pub const EXIT_UPLOAD_FAILED: i32 = 2;
/// Exit code for any other fatal failure (store, serialization, local I/O).
pub const EXIT_FATAL: i32 = 3;

/// Problems detected while resolving configuration, before any I/O.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {var} is not set")]
    MissingSecret { var: String },

    #[error("PostgreSQL connection parameters missing: --pg-user (or PGUSER) is required")]
    MissingPgUser,

    #[error("PostgreSQL connection parameters missing: --pg-database (or PGDATABASE) is required")]
    MissingPgDatabase,

    #[error("query is empty")]
    EmptyQuery,

    #[error("--fetch-size must be greater than zero")]
    InvalidFetchSize,

    #[error("invalid value '{value}' for {flag}: {reason}")]
    InvalidDuration {
        flag: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid WebDAV URL '{url}': {reason}")]
    InvalidWebDavUrl { url: String, reason: String },

    #[error("remote file name must not contain '/': {0}")]
    InvalidRemoteName(String),
}

/// Everything that can end an export run unsuccessfully.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to prepare local file: {0}")]
    Artifact(#[source] std::io::Error),

    #[error("Query failed: {0}")]
    Source(#[source] CursorError),

    #[error("CSV export failed: {0}")]
    Csv(#[from] CsvExportError),

    #[error(transparent)]
    WebDav(#[from] WebDavError),

    #[error("Upload to {url} failed: {status} {body}")]
    UploadRejected {
        url: Url,
        status: StatusCode,
        body: String,
    },
}

/// Exit code for a command-line parse failure.
///
/// Usage errors count as precondition failures so they never share clap's
/// default code with [`EXIT_UPLOAD_FAILED`]; `--help` and `--version` exit 0.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        EXIT_PRECONDITION
    } else {
        0
    }
}

impl ExportError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::Config(_) => EXIT_PRECONDITION,
            ExportError::UploadRejected { .. } => EXIT_UPLOAD_FAILED,
            ExportError::Artifact(_)
            | ExportError::Source(_)
            | ExportError::Csv(_)
            | ExportError::WebDav(_) => EXIT_FATAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cli;
    use clap::Parser;

    fn usage_code(args: &[&str]) -> i32 {
        let err = Cli::try_parse_from(args).unwrap_err();
        usage_exit_code(&err)
    }

    #[test]
    fn test_usage_errors_are_preconditions() {
        assert_eq!(usage_code(&["pg-dav-export"]), EXIT_PRECONDITION);
        assert_eq!(
            usage_code(&["pg-dav-export", "--query", "SELECT 1", "--pg-port", "not-a-port"]),
            EXIT_PRECONDITION
        );
        assert_eq!(
            usage_code(&["pg-dav-export", "--query", "SELECT 1", "--no-such-flag"]),
            EXIT_PRECONDITION
        );
        assert_ne!(usage_code(&["pg-dav-export"]), EXIT_UPLOAD_FAILED);
    }

    #[test]
    fn test_help_exits_zero() {
        assert_eq!(usage_code(&["pg-dav-export", "--help"]), 0);
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let precondition = ExportError::from(ConfigError::MissingPgUser).exit_code();
        let upload = ExportError::UploadRejected {
            url: Url::parse("https://example.com/x.csv").unwrap(),
            status: StatusCode::FORBIDDEN,
            body: "forbidden".to_string(),
        }
        .exit_code();
        let fatal = ExportError::Source(CursorError::Closed).exit_code();

        assert_eq!(precondition, EXIT_PRECONDITION);
        assert_eq!(upload, EXIT_UPLOAD_FAILED);
        assert_eq!(fatal, EXIT_FATAL);
        assert_ne!(precondition, 0);
        assert_ne!(precondition, upload);
        assert_ne!(upload, fatal);
    }

    #[test]
    fn test_upload_error_message_includes_status_and_body() {
        let err = ExportError::UploadRejected {
            url: Url::parse("https://example.com/x.csv").unwrap(),
            status: StatusCode::FORBIDDEN,
            body: "quota exceeded".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("403"));
        assert!(message.contains("quota exceeded"));
    }
}
