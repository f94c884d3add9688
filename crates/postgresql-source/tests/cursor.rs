//! Integration tests for the PostgreSQL cursor source
//!
//! These need a reachable PostgreSQL server. Connection settings come from the
//! usual libpq variables (PGHOST, PGPORT, PGUSER, PGPASSWORD, PGDATABASE).
//! Run with `cargo test -- --ignored`.

use anyhow::Result;
use export_core::{ColumnKind, ExportValue, RowCursor, RowSource, RowStream};
use pg_dav_export_postgresql::{PgConnectOpts, PostgresCursor};
use std::time::Duration;

fn opts_from_env() -> PgConnectOpts {
    let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.into());
    PgConnectOpts {
        host: var("PGHOST", "postgresql"),
        port: var("PGPORT", "5432").parse().unwrap(),
        user: var("PGUSER", "postgres"),
        password: Some(var("PGPASSWORD", "postgres")),
        database: var("PGDATABASE", "postgres"),
        connect_timeout: Duration::from_secs(10),
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_cursor_streams_generated_series() -> Result<()> {
    let _ = tracing_subscriber::fmt().with_env_filter("debug").try_init();

    let cursor = PostgresCursor::open(
        &opts_from_env(),
        "SELECT g AS id, 'row ' || g AS label, now() AS ts FROM generate_series(1, 2500) g;",
    )
    .await?;

    let mut stream = RowStream::new(cursor, 1000);
    let columns = stream.columns();
    assert_eq!(columns.names(), vec!["id", "label", "ts"]);
    assert_eq!(columns.get(0).unwrap().kind, ColumnKind::Integer);
    assert_eq!(columns.get(2).unwrap().kind, ColumnKind::TimestampTz);

    let mut count = 0i64;
    while let Some(row) = stream.next_row().await? {
        count += 1;
        assert_eq!(row.get("id"), Some(&ExportValue::Int(count)));
        assert!(stream.buffered() < 1000);
    }
    assert_eq!(count, 2500);
    assert_eq!(stream.batches_fetched(), 3);

    stream.close().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_cursor_reports_columns_for_empty_result() -> Result<()> {
    let mut cursor = PostgresCursor::open(
        &opts_from_env(),
        "SELECT 1::int AS a, 'x'::text AS b WHERE false",
    )
    .await?;

    assert_eq!(cursor.columns().names(), vec!["a", "b"]);
    assert!(cursor.fetch(10).await?.is_empty());
    cursor.close().await?;
    // second close is a no-op
    cursor.close().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_invalid_query_fails_before_streaming() {
    let result = PostgresCursor::open(&opts_from_env(), "SELECT * FROM no_such_table").await;
    assert!(result.is_err());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_connect_opts_open_as_row_source() -> Result<()> {
    let opts = opts_from_env();
    let mut cursor = RowSource::open(&opts, "SELECT 1 AS one").await?;
    assert_eq!(cursor.columns().names(), vec!["one"]);

    let batch = cursor.fetch(10).await?;
    assert_eq!(batch.len(), 1);
    assert!(cursor.fetch(10).await?.is_empty());
    cursor.close().await?;
    Ok(())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL server"]
async fn test_extended_types_decode_exactly() -> Result<()> {
    let opts = opts_from_env();
    let (client, connection) = opts.to_config().connect(tokio_postgres::NoTls).await?;
    let driver = tokio::spawn(connection);
    client
        .batch_execute(
            "DROP TYPE IF EXISTS export_test_mood; \
             CREATE TYPE export_test_mood AS ENUM ('sad', 'happy')",
        )
        .await?;

    let mut cursor = PostgresCursor::open(
        &opts,
        "SELECT 'happy'::export_test_mood AS mood, \
                ARRAY['sad', 'happy']::export_test_mood[] AS moods, \
                1e32::numeric AS big, \
                0.12345678901234567890123456789012::numeric AS precise, \
                'NaN'::numeric AS nan, \
                0.1::real AS ratio, \
                interval '1 day 02:30' AS span, \
                '10.0.0.0/8'::cidr AS net",
    )
    .await?;
    let rows = cursor.fetch(10).await?;
    cursor.close().await?;

    let text = |s: &str| ExportValue::Text(s.to_string());
    let numeric = |s: &str| ExportValue::Numeric(s.to_string());
    let row = &rows[0];
    assert_eq!(row.get("mood"), Some(&text("happy")));
    assert_eq!(
        row.get("moods"),
        Some(&ExportValue::Array(vec![text("sad"), text("happy")]))
    );
    assert_eq!(
        row.get("big"),
        Some(&numeric(&format!("1{}", "0".repeat(32))))
    );
    assert_eq!(
        row.get("precise"),
        Some(&numeric("0.12345678901234567890123456789012"))
    );
    assert_eq!(row.get("nan"), Some(&numeric("NaN")));
    assert_eq!(row.get("ratio"), Some(&ExportValue::Float32(0.1)));
    assert_eq!(row.get("span"), Some(&text("1 day 02:30:00")));
    assert_eq!(row.get("net"), Some(&text("10.0.0.0/8")));

    client.batch_execute("DROP TYPE export_test_mood").await?;
    drop(client);
    driver.await??;
    Ok(())
}
