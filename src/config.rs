//! Command-line options and their resolution into an [`ExportConfig`].
//!
//! Precedence is CLI flag, then environment variable, then default; clap
//! handles the first two through `env = ...`. The WebDAV secret is the one
//! value never taken from a flag: it is read from the environment variable
//! named by `--token-env`, so it does not show up in process listings.

pub mod duration;

use crate::error::ConfigError;
use chrono::{DateTime, Utc};
use clap::{Args, Parser};
use pg_dav_export_postgresql::{normalize_query, PgConnectOpts};
use pg_dav_export_webdav::{Credential, Url};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "pg-dav-export")]
#[command(about = "Run a PostgreSQL query, save the result as CSV and upload it to a WebDAV store")]
#[command(long_about = None)]
pub struct Cli {
    /// PostgreSQL connection options
    #[command(flatten)]
    pub pg: PgArgs,

    /// SQL query to export
    #[arg(long)]
    pub query: String,

    /// WebDAV target options
    #[command(flatten)]
    pub webdav: WebDavArgs,

    /// Local path for the CSV file. When given, the file is kept after the run;
    /// otherwise a temporary file is used and removed.
    #[arg(long, value_name = "PATH")]
    pub local_temp: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PgArgs {
    /// PostgreSQL host
    #[arg(long, default_value = "localhost", env = "PGHOST")]
    pub pg_host: String,

    /// PostgreSQL port
    #[arg(long, default_value_t = 5432, env = "PGPORT")]
    pub pg_port: u16,

    /// PostgreSQL user (required)
    #[arg(long, env = "PGUSER")]
    pub pg_user: Option<String>,

    /// PostgreSQL password
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    pub pg_password: Option<String>,

    /// PostgreSQL database (required)
    #[arg(long, env = "PGDATABASE")]
    pub pg_database: Option<String>,

    /// Rows fetched from the server-side cursor per round trip
    #[arg(long, default_value_t = export_core::DEFAULT_FETCH_SIZE)]
    pub fetch_size: usize,

    /// Connection timeout (e.g. "30", "30s", "1m")
    #[arg(long, default_value = "30s")]
    pub connect_timeout: String,
}

#[derive(Args, Debug, Clone)]
pub struct WebDavArgs {
    /// WebDAV root URL
    #[arg(long, default_value = "https://webdav.yandex.ru", env = "WEBDAV_URL")]
    pub webdav_url: String,

    /// WebDAV login; an empty login is sent when absent
    #[arg(long, env = "YANDEX_LOGIN")]
    pub webdav_login: Option<String>,

    /// Name of the environment variable holding the WebDAV token/password
    #[arg(long, default_value = "YANDEX_DISK_TOKEN")]
    pub token_env: String,

    /// Remote directory, slash-delimited (e.g. "Backups/sql_results")
    #[arg(long, default_value = "Backups")]
    pub remote_dir: String,

    /// Remote file name; defaults to "<database>_query_<UTC timestamp>.csv"
    #[arg(long)]
    pub remote_name: Option<String>,

    /// Timeout for each WebDAV request. It bounds the whole upload, so raise
    /// it for large exports (e.g. "10m", "1h")
    #[arg(long, default_value = "10m")]
    pub http_timeout: String,
}

/// Fully resolved, immutable configuration for one export run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub pg: PgConnectOpts,
    pub query: String,
    pub fetch_size: usize,
    pub webdav_url: String,
    pub credential: Credential,
    pub remote_dir: String,
    pub remote_name: String,
    pub http_timeout: Duration,
    /// Caller-supplied persistent path; `None` means use a temporary file
    pub local_path: Option<PathBuf>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn duration_arg(flag: &'static str, value: &str) -> Result<Duration, ConfigError> {
    duration::parse_duration(value).map_err(|e| ConfigError::InvalidDuration {
        flag,
        value: value.to_string(),
        reason: format!("{e:#}"),
    })
}

/// Default remote file name: `<database>_query_<YYYY-MM-DD_HHMMSS>.csv` in UTC.
pub fn default_remote_name(database: &str, now: DateTime<Utc>) -> String {
    format!("{database}_query_{}.csv", now.format("%Y-%m-%d_%H%M%S"))
}

impl ExportConfig {
    /// Validate the parsed options and look up the transfer secret.
    ///
    /// `env` is consulted only for the secret. Nothing here touches the
    /// network or the database.
    pub fn resolve(
        cli: Cli,
        env: impl Fn(&str) -> Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, ConfigError> {
        let secret = non_empty(env(&cli.webdav.token_env)).ok_or_else(|| {
            ConfigError::MissingSecret {
                var: cli.webdav.token_env.clone(),
            }
        })?;

        let user = non_empty(cli.pg.pg_user).ok_or(ConfigError::MissingPgUser)?;
        let database = non_empty(cli.pg.pg_database).ok_or(ConfigError::MissingPgDatabase)?;

        let query = normalize_query(&cli.query)
            .ok_or(ConfigError::EmptyQuery)?
            .to_string();

        if cli.pg.fetch_size == 0 {
            return Err(ConfigError::InvalidFetchSize);
        }

        Url::parse(&cli.webdav.webdav_url).map_err(|e| ConfigError::InvalidWebDavUrl {
            url: cli.webdav.webdav_url.clone(),
            reason: e.to_string(),
        })?;

        let connect_timeout = duration_arg("--connect-timeout", &cli.pg.connect_timeout)?;
        let http_timeout = duration_arg("--http-timeout", &cli.webdav.http_timeout)?;

        let remote_name = match non_empty(cli.webdav.remote_name) {
            Some(name) if name.contains('/') => {
                return Err(ConfigError::InvalidRemoteName(name));
            }
            Some(name) => name,
            None => default_remote_name(&database, now),
        };

        Ok(Self {
            pg: PgConnectOpts {
                host: cli.pg.pg_host,
                port: cli.pg.pg_port,
                user,
                password: non_empty(cli.pg.pg_password),
                database,
                connect_timeout,
            },
            query,
            fetch_size: cli.pg.fetch_size,
            webdav_url: cli.webdav.webdav_url,
            credential: Credential::new(cli.webdav.webdav_login.unwrap_or_default(), secret),
            remote_dir: cli.webdav.remote_dir.trim_matches('/').to_string(),
            remote_name,
            http_timeout,
            local_path: cli.local_temp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cli() -> Cli {
        Cli {
            pg: PgArgs {
                pg_host: "db.internal".to_string(),
                pg_port: 5433,
                pg_user: Some("exporter".to_string()),
                pg_password: None,
                pg_database: Some("sales".to_string()),
                fetch_size: 500,
                connect_timeout: "5s".to_string(),
            },
            query: "SELECT 1;".to_string(),
            webdav: WebDavArgs {
                webdav_url: "https://webdav.example.com".to_string(),
                webdav_login: Some("robot".to_string()),
                token_env: "TEST_DAV_TOKEN".to_string(),
                remote_dir: "/Backups/sql_results/".to_string(),
                remote_name: None,
                http_timeout: "2m".to_string(),
            },
            local_temp: None,
        }
    }

    fn with_token(name: &str) -> Option<String> {
        (name == "TEST_DAV_TOKEN").then(|| "secret".to_string())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 8, 3, 9).unwrap()
    }

    #[test]
    fn test_resolve_full_config() {
        let config = ExportConfig::resolve(cli(), with_token, now()).unwrap();
        assert_eq!(config.pg.host, "db.internal");
        assert_eq!(config.pg.port, 5433);
        assert_eq!(config.pg.user, "exporter");
        assert_eq!(config.pg.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.query, "SELECT 1");
        assert_eq!(config.fetch_size, 500);
        assert_eq!(config.remote_dir, "Backups/sql_results");
        assert_eq!(config.remote_name, "sales_query_2024-05-17_080309.csv");
        assert_eq!(config.http_timeout, Duration::from_secs(120));
        assert_eq!(config.credential.identity(), "robot");
        assert!(config.local_path.is_none());
    }

    #[test]
    fn test_missing_secret() {
        let err = ExportConfig::resolve(cli(), |_| None, now()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret { var } if var == "TEST_DAV_TOKEN"));

        let err = ExportConfig::resolve(cli(), |_| Some("  ".to_string()), now()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret { .. }));
    }

    #[test]
    fn test_missing_user_or_database() {
        let mut args = cli();
        args.pg.pg_user = None;
        assert!(matches!(
            ExportConfig::resolve(args, with_token, now()),
            Err(ConfigError::MissingPgUser)
        ));

        let mut args = cli();
        args.pg.pg_database = Some(String::new());
        assert!(matches!(
            ExportConfig::resolve(args, with_token, now()),
            Err(ConfigError::MissingPgDatabase)
        ));
    }

    #[test]
    fn test_invalid_values() {
        let mut args = cli();
        args.query = " ; ".to_string();
        assert!(matches!(
            ExportConfig::resolve(args, with_token, now()),
            Err(ConfigError::EmptyQuery)
        ));

        let mut args = cli();
        args.pg.fetch_size = 0;
        assert!(matches!(
            ExportConfig::resolve(args, with_token, now()),
            Err(ConfigError::InvalidFetchSize)
        ));

        let mut args = cli();
        args.webdav.http_timeout = "soon".to_string();
        assert!(matches!(
            ExportConfig::resolve(args, with_token, now()),
            Err(ConfigError::InvalidDuration { flag: "--http-timeout", .. })
        ));

        let mut args = cli();
        args.webdav.remote_name = Some("a/b.csv".to_string());
        assert!(matches!(
            ExportConfig::resolve(args, with_token, now()),
            Err(ConfigError::InvalidRemoteName(_))
        ));
    }

    #[test]
    fn test_explicit_remote_name_and_local_path() {
        let mut args = cli();
        args.webdav.remote_name = Some("users_last7days.csv".to_string());
        args.local_temp = Some(PathBuf::from("/tmp/keep.csv"));
        let config = ExportConfig::resolve(args, with_token, now()).unwrap();
        assert_eq!(config.remote_name, "users_last7days.csv");
        assert_eq!(config.local_path, Some(PathBuf::from("/tmp/keep.csv")));
    }

    #[test]
    fn test_cli_flags_parse() {
        let cli = Cli::try_parse_from([
            "pg-dav-export",
            "--pg-host",
            "h",
            "--pg-port",
            "6543",
            "--pg-user",
            "u",
            "--pg-database",
            "d",
            "--query",
            "SELECT now()",
            "--remote-dir",
            "A/B",
            "--remote-name",
            "r.csv",
            "--fetch-size",
            "250",
            "--token-env",
            "MY_TOKEN",
        ])
        .unwrap();
        assert_eq!(cli.pg.pg_host, "h");
        assert_eq!(cli.pg.pg_port, 6543);
        assert_eq!(cli.pg.fetch_size, 250);
        assert_eq!(cli.webdav.remote_dir, "A/B");
        assert_eq!(cli.webdav.token_env, "MY_TOKEN");
    }

    #[test]
    fn test_query_is_required() {
        assert!(Cli::try_parse_from(["pg-dav-export", "--pg-user", "u"]).is_err());
    }
}
