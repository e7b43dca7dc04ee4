//! Init command implementation.

use anyhow::{Context as _, Result};
use serde_json::json;

use super::print_json;
use crate::cli::CommandContext;
use crate::storage::apply_schema;

/// Execute the init command.
///
/// Creates the database file if needed and the two ingestion tables if they
/// are missing. Existing tables and rows are left alone.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the DDL fails.
pub fn execute(ctx: &CommandContext) -> Result<()> {
    let store = ctx.open_store()?;
    let conn = store.pool().get()?;
    apply_schema(&conn).context("failed to create ingestion tables")?;
    drop(conn);

    let path = store.pool().path().display().to_string();
    store.shutdown();
    if ctx.json {
        print_json(&json!({ "initialized": true, "database": path }))?;
    } else {
        println!("Initialized ingestion tables in {path}");
    }
    Ok(())
}
