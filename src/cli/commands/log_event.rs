//! Log-event command implementation.

use anyhow::Result;
use serde_json::json;

use super::print_json;
use crate::cli::{CommandContext, LogEventArgs};
use crate::model::NewIngestionEvent;

/// Execute the log-event command.
///
/// # Errors
///
/// Returns an error if validation or the write fails.
pub fn execute(args: &LogEventArgs, ctx: &CommandContext) -> Result<()> {
    let event = NewIngestionEvent {
        source: args.source.clone(),
        url: args.url.clone(),
        content_hash: args.content_hash.clone(),
        event_type: args.event_type.clone(),
        reason: args.reason.clone(),
    };

    let store = ctx.open_store()?;
    store.log_ingestion_event(&event)?;
    store.shutdown();

    if ctx.json {
        print_json(&json!({ "logged": true, "event": event }))?;
    } else {
        println!("Logged {} event from {}", event.event_type, event.source);
    }
    Ok(())
}
