//! Deduplicated metadata rows for raw fetched documents.
//!
//! `(source, content_hash)` is unique. A second insert for the same pair is
//! dropped by `ON CONFLICT ... DO NOTHING` and reported back as "not
//! inserted" rather than as an error.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};

use crate::error::{Result, StoreError};
use crate::model::NewRawDocument;

/// DDL for the `raw_documents` table.
///
/// `payload_meta` is JSON text kept canonical by `json()` on the way in and
/// guarded by `json_valid`, so it can be queried with `json_extract`.
pub const RAW_DOCUMENTS_SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS raw_documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source TEXT NOT NULL,
    url TEXT,
    fetched_at TEXT NOT NULL,
    security_status TEXT NOT NULL,
    rejection_reason TEXT,
    content_type TEXT,
    content_length INTEGER CHECK (content_length IS NULL OR content_length >= 0),
    content_hash TEXT NOT NULL,
    object_bucket TEXT,
    object_path TEXT,
    payload_meta TEXT NOT NULL DEFAULT '{}' CHECK (json_valid(payload_meta)),
    UNIQUE (source, content_hash)
);
CREATE INDEX IF NOT EXISTS idx_raw_documents_content_hash ON raw_documents(content_hash);
";

/// Columns a usable `raw_documents` table must have.
pub const RAW_DOCUMENTS_COLUMNS: &[&str] = &[
    "source",
    "url",
    "fetched_at",
    "security_status",
    "rejection_reason",
    "content_type",
    "content_length",
    "content_hash",
    "object_bucket",
    "object_path",
    "payload_meta",
];

/// Columns of the dedup key, in constraint order.
pub const DEDUP_KEY_COLUMNS: [&str; 2] = ["source", "content_hash"];

const INSERT_DOCUMENT_SQL: &str = "INSERT INTO raw_documents \
     (source, url, fetched_at, security_status, rejection_reason, \
      content_type, content_length, content_hash, object_bucket, object_path, payload_meta) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, json(?11)) \
     ON CONFLICT (source, content_hash) DO NOTHING";

/// Create the `raw_documents` table if it does not exist.
///
/// # Errors
///
/// Returns an error if the DDL fails.
pub fn init_raw_documents_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(RAW_DOCUMENTS_SCHEMA)?;
    Ok(())
}

/// Format a timestamp the way `fetched_at` is stored.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Insert one metadata row unless its dedup key already exists.
///
/// Returns `true` if a row was written, `false` if the key was taken. The
/// caller owns the surrounding transaction.
///
/// # Errors
///
/// Returns `Json` if the payload cannot be serialized, `Validation` if
/// `content_length` does not fit the column, or `Database` for any other
/// failure, including constraint violations other than the dedup key.
pub fn insert_raw_document(
    conn: &Connection,
    doc: &NewRawDocument,
    fetched_at: DateTime<Utc>,
) -> Result<bool> {
    let payload = serde_json::to_string(&doc.payload_meta)?;
    let content_length = doc
        .content_length
        .map(i64::try_from)
        .transpose()
        .map_err(|_| StoreError::validation("content_length", "exceeds the storable range"))?;

    let mut stmt = conn.prepare_cached(INSERT_DOCUMENT_SQL)?;
    let changed = stmt.execute(params![
        doc.source,
        doc.url.as_deref(),
        format_timestamp(fetched_at),
        doc.security_status.as_str(),
        doc.rejection_reason.as_deref(),
        doc.content_type.as_deref(),
        content_length,
        doc.content_hash,
        doc.object_bucket.as_deref(),
        doc.object_path.as_deref(),
        payload,
    ])?;
    Ok(changed == 1)
}
