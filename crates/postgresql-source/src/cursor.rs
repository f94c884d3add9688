//! Server-side cursor over a PostgreSQL query.

use crate::error::PostgresSourceError;
use crate::value::{columns_from_descriptor, convert_row};
use async_trait::async_trait;
use export_core::{ColumnSet, CursorError, ExportRow, RowCursor, RowSource};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls, Statement};
use tracing::{debug, error, info, warn};

/// Name of the server-side cursor declared for the export.
pub const CURSOR_NAME: &str = "export_cursor";

/// PostgreSQL connection options
#[derive(Clone)]
pub struct PgConnectOpts {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for PgConnectOpts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnectOpts")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl PgConnectOpts {
    pub fn to_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .dbname(&self.database)
            .connect_timeout(self.connect_timeout)
            .application_name("pg-dav-export");
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }
}

/// Strip surrounding whitespace and trailing statement terminators so the
/// query can be embedded in `DECLARE ... CURSOR FOR`.
pub fn normalize_query(query: &str) -> Option<&str> {
    let trimmed = query.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace());
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// A named, forward-only cursor held open inside a transaction.
///
/// The connection is owned by the cursor; [`RowCursor::close`] rolls the
/// transaction back (which also releases the cursor) and drops the
/// connection. Dropping without closing still ends the session.
pub struct PostgresCursor {
    client: Option<Client>,
    connection: Option<JoinHandle<()>>,
    columns: Arc<ColumnSet>,
    fetch_statement: Option<(usize, Statement)>,
}

impl PostgresCursor {
    /// Connect, describe the query, and declare the cursor.
    ///
    /// The column set is taken from the statement description, so it is
    /// available even when the query returns no rows.
    pub async fn open(opts: &PgConnectOpts, query: &str) -> Result<Self, PostgresSourceError> {
        let query = normalize_query(query).ok_or(PostgresSourceError::EmptyQuery)?;

        info!(
            "Connecting to PostgreSQL at {}:{} (database {})",
            opts.host, opts.port, opts.database
        );
        let (client, connection) =
            opts.to_config()
                .connect(NoTls)
                .await
                .map_err(|source| PostgresSourceError::Connect {
                    host: opts.host.clone(),
                    port: opts.port,
                    source,
                })?;

        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("PostgreSQL connection error: {e}");
            }
        });

        let declared = declare(&client, query).await;
        let mut cursor = Self {
            client: Some(client),
            connection: Some(connection),
            columns: Arc::new(ColumnSet::default()),
            fetch_statement: None,
        };

        match declared {
            Ok(columns) => {
                cursor.columns = Arc::new(columns);
                Ok(cursor)
            }
            Err(e) => {
                if let Err(close_err) = cursor.close().await {
                    warn!("Failed to release PostgreSQL session after error: {close_err}");
                }
                Err(e)
            }
        }
    }

    async fn fetch_statement(&mut self, max_rows: usize) -> Result<Statement, CursorError> {
        if let Some((size, statement)) = &self.fetch_statement {
            if *size == max_rows {
                return Ok(statement.clone());
            }
        }
        let client = self.client.as_ref().ok_or(CursorError::Closed)?;
        let statement = client
            .prepare(&format!("FETCH FORWARD {max_rows} FROM {CURSOR_NAME}"))
            .await
            .map_err(CursorError::store)?;
        self.fetch_statement = Some((max_rows, statement.clone()));
        Ok(statement)
    }
}

/// Describe the query, then open a transaction and declare the cursor in it.
async fn declare(client: &Client, query: &str) -> Result<ColumnSet, PostgresSourceError> {
    let statement = client
        .prepare(query)
        .await
        .map_err(PostgresSourceError::Prepare)?;
    if statement.columns().is_empty() {
        return Err(PostgresSourceError::NoResultColumns);
    }
    let columns = columns_from_descriptor(statement.columns());
    debug!("Query columns: {:?}", columns.names());

    client
        .batch_execute("BEGIN")
        .await
        .map_err(PostgresSourceError::Declare)?;
    client
        .batch_execute(&format!(
            "DECLARE {CURSOR_NAME} NO SCROLL CURSOR FOR {query}"
        ))
        .await
        .map_err(PostgresSourceError::Declare)?;

    Ok(columns)
}

#[async_trait]
impl RowSource for PgConnectOpts {
    type Cursor = PostgresCursor;

    async fn open(&self, query: &str) -> Result<PostgresCursor, CursorError> {
        Ok(PostgresCursor::open(self, query).await?)
    }
}

#[async_trait]
impl RowCursor for PostgresCursor {
    fn columns(&self) -> Arc<ColumnSet> {
        Arc::clone(&self.columns)
    }

    async fn fetch(&mut self, max_rows: usize) -> Result<Vec<ExportRow>, CursorError> {
        let statement = self.fetch_statement(max_rows).await?;
        let client = self.client.as_ref().ok_or(CursorError::Closed)?;
        let rows = client
            .query(&statement, &[])
            .await
            .map_err(CursorError::store)?;

        rows.iter()
            .map(|row| convert_row(row, &self.columns))
            .collect()
    }

    async fn close(&mut self) -> Result<(), CursorError> {
        let Some(client) = self.client.take() else {
            return Ok(());
        };
        self.fetch_statement = None;

        // Rolling back ends the transaction and closes the cursor with it
        let result = client
            .batch_execute("ROLLBACK")
            .await
            .map_err(CursorError::store);
        drop(client);

        if let Some(connection) = self.connection.take() {
            if let Err(e) = connection.await {
                warn!("PostgreSQL connection task ended abnormally: {e}");
            }
        }
        debug!("Released PostgreSQL cursor and connection");
        result
    }
}
