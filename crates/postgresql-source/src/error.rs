//! Error types for the PostgreSQL row source.

use export_core::CursorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostgresSourceError {
    #[error("Failed to connect to PostgreSQL at {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: tokio_postgres::Error,
    },

    #[error("Query is empty")]
    EmptyQuery,

    #[error("Failed to prepare query: {0}")]
    Prepare(#[source] tokio_postgres::Error),

    #[error("Query does not return rows")]
    NoResultColumns,

    #[error("Failed to open server-side cursor: {0}")]
    Declare(#[source] tokio_postgres::Error),
}

impl From<PostgresSourceError> for CursorError {
    fn from(err: PostgresSourceError) -> Self {
        CursorError::store(err)
    }
}
