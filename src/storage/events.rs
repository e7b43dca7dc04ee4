//! Append-only ingestion event log.
//!
//! Rows are only ever inserted. `logged_at` comes from the column default so
//! the timestamp is the store's clock at write time, never the caller's.

use rusqlite::{Connection, params};

use crate::error::Result;
use crate::model::NewIngestionEvent;

/// DDL for the `ingestion_events` table.
pub const INGESTION_EVENTS_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS ingestion_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL,
    url TEXT,
    content_hash TEXT,
    event_type TEXT NOT NULL,
    reason TEXT,
    logged_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
CREATE INDEX IF NOT EXISTS idx_ingestion_events_source ON ingestion_events(source);
CREATE INDEX IF NOT EXISTS idx_ingestion_events_content_hash ON ingestion_events(content_hash);
";

/// Columns a usable `ingestion_events` table must have.
pub const INGESTION_EVENTS_COLUMNS: &[&str] = &[
    "source",
    "url",
    "content_hash",
    "event_type",
    "reason",
    "logged_at",
];

const INSERT_EVENT_SQL: &str = "INSERT INTO ingestion_events \
     (source, url, content_hash, event_type, reason) \
     VALUES (?1, ?2, ?3, ?4, ?5)";

/// Create the `ingestion_events` table if it does not exist.
///
/// # Errors
///
/// Returns an error if the DDL fails.
pub fn init_ingestion_events_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(INGESTION_EVENTS_SCHEMA)?;
    Ok(())
}

/// Append one event row and return its row id.
///
/// The caller owns the surrounding transaction.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_ingestion_event(conn: &Connection, event: &NewIngestionEvent) -> Result<i64> {
    let mut stmt = conn.prepare_cached(INSERT_EVENT_SQL)?;
    stmt.execute(params![
        event.source,
        event.url.as_deref(),
        event.content_hash.as_deref(),
        event.event_type,
        event.reason.as_deref(),
    ])?;
    Ok(conn.last_insert_rowid())
}
