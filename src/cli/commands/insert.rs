//! Insert command implementation.

use std::fs;

use anyhow::{Context as _, Result, bail};
use serde_json::{Map, Value, json};

use super::print_json;
use crate::cli::{CommandContext, InsertArgs};
use crate::model::{NewRawDocument, SecurityStatus};

/// Execute the insert command.
///
/// A row that already exists for the same source and hash is left as is and
/// the command still succeeds.
///
/// # Errors
///
/// Returns an error if the inputs are invalid, the document file cannot be
/// read, or the write fails.
pub fn execute(args: &InsertArgs, ctx: &CommandContext) -> Result<()> {
    let doc = build_document(args)?;

    let store = ctx.open_store()?;
    store.insert_raw_metadata(&doc)?;
    store.shutdown();

    if ctx.json {
        print_json(&json!({ "recorded": true, "document": doc }))?;
    } else {
        println!("Recorded {} from {}", doc.content_hash, doc.source);
    }
    Ok(())
}

fn build_document(args: &InsertArgs) -> Result<NewRawDocument> {
    let status: SecurityStatus = args.status.parse()?;
    let payload_meta = parse_meta(args.meta.as_deref())?;

    let mut doc = if let Some(path) = &args.file {
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        NewRawDocument::from_bytes(&args.source, status, &bytes, payload_meta)
    } else {
        let hash = args.content_hash.clone().unwrap_or_default();
        NewRawDocument::new(&args.source, status, hash, payload_meta)
    };

    doc.url.clone_from(&args.url);
    doc.rejection_reason.clone_from(&args.rejection_reason);
    doc.content_type.clone_from(&args.content_type);
    if let Some(length) = args.content_length {
        doc.content_length = Some(length);
    }
    doc.object_bucket.clone_from(&args.bucket);
    doc.object_path.clone_from(&args.object_path);
    Ok(doc)
}

fn parse_meta(raw: Option<&str>) -> Result<Map<String, Value>> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };
    match serde_json::from_str::<Value>(raw).context("--meta is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("--meta must be a JSON object, got {}", json_kind(&other)),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
