//! Schema bootstrap and inspection.
//!
//! The tables are normally provisioned outside this crate. [`apply_schema`]
//! exists for fresh local databases and tests; it only issues
//! `CREATE ... IF NOT EXISTS`. [`check_schema`] reports whether an existing
//! database has what the store writes to.

use rusqlite::Connection;
use serde::Serialize;

use super::documents::{DEDUP_KEY_COLUMNS, RAW_DOCUMENTS_COLUMNS, init_raw_documents_table};
use super::events::{INGESTION_EVENTS_COLUMNS, init_ingestion_events_table};
use crate::error::Result;

/// Create both tables if they do not exist.
///
/// # Errors
///
/// Returns an error if the DDL fails.
pub fn apply_schema(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    init_ingestion_events_table(&tx)?;
    init_raw_documents_table(&tx)?;
    tx.commit()?;
    Ok(())
}

/// Findings for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCheck {
    pub table: String,
    pub present: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_columns: Vec<String>,
}

impl TableCheck {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.present && self.missing_columns.is_empty()
    }
}

/// What [`check_schema`] found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    pub tables: Vec<TableCheck>,
    /// A full unique index over `(source, content_hash)` exists.
    pub dedup_constraint: bool,
    /// The engine can parse and validate JSON.
    pub json_support: bool,
}

impl SchemaReport {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.tables.iter().all(TableCheck::is_ok) && self.dedup_constraint && self.json_support
    }
}

/// Inspect the schema without modifying it.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read.
pub fn check_schema(conn: &Connection) -> Result<SchemaReport> {
    let tables = vec![
        check_table(conn, "ingestion_events", INGESTION_EVENTS_COLUMNS)?,
        check_table(conn, "raw_documents", RAW_DOCUMENTS_COLUMNS)?,
    ];
    let dedup_constraint = tables[1].present && has_dedup_index(conn)?;
    let json_support = json_probe_outcome(conn.query_row(
        "SELECT json_valid('{}')",
        [],
        |row| row.get::<_, i64>(0),
    ))?;

    Ok(SchemaReport {
        tables,
        dedup_constraint,
        json_support,
    })
}

fn collect_table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut columns = Vec::new();
    for row in rows {
        columns.push(row?);
    }
    Ok(columns)
}

/// Only a missing JSON1 function means no JSON support; other probe errors
/// propagate.
fn json_probe_outcome(probe: rusqlite::Result<i64>) -> Result<bool> {
    match probe {
        Ok(value) => Ok(value == 1),
        Err(rusqlite::Error::SqliteFailure(_, Some(ref msg)))
            if msg.starts_with("no such function") =>
        {
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

fn check_table(conn: &Connection, table: &str, required: &[&str]) -> Result<TableCheck> {
    let columns = collect_table_columns(conn, table)?;
    let present = !columns.is_empty();
    let missing_columns = if present {
        required
            .iter()
            .filter(|col| !columns.iter().any(|c| c == *col))
            .map(|col| (*col).to_string())
            .collect()
    } else {
        Vec::new()
    };
    Ok(TableCheck {
        table: table.to_string(),
        present,
        missing_columns,
    })
}

fn has_dedup_index(conn: &Connection) -> Result<bool> {
    let mut stmt = conn.prepare("PRAGMA index_list(raw_documents)")?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>("name")?,
            row.get::<_, i64>("unique")?,
            row.get::<_, i64>("partial")?,
        ))
    })?;

    let mut unique_indexes = Vec::new();
    for row in rows {
        let (name, unique, partial) = row?;
        if unique == 1 && partial == 0 {
            unique_indexes.push(name);
        }
    }

    for name in unique_indexes {
        let mut info = conn.prepare(&format!("PRAGMA index_info(\"{name}\")"))?;
        let cols = info.query_map([], |row| row.get::<_, Option<String>>("name"))?;
        let mut key = Vec::new();
        for col in cols {
            key.push(col?.unwrap_or_default());
        }
        key.sort();
        let mut expected = DEDUP_KEY_COLUMNS.map(str::to_string).to_vec();
        expected.sort();
        if key == expected {
            return Ok(true);
        }
    }
    Ok(false)
}
