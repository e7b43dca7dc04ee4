//! Hash command implementation.

use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{Context as _, Result};
use serde_json::json;

use super::print_json;
use crate::cli::{CommandContext, HashArgs};
use crate::util::content_hash_reader;

/// Execute the hash command.
///
/// # Errors
///
/// Returns an error if the input cannot be read.
pub fn execute(args: &HashArgs, ctx: &CommandContext) -> Result<()> {
    let hash = match &args.file {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            content_hash_reader(BufReader::new(file))
                .with_context(|| format!("failed to read {}", path.display()))?
        }
        None => content_hash_reader(io::stdin().lock()).context("failed to read stdin")?,
    };

    if ctx.json {
        let input = args
            .file
            .as_ref()
            .map_or_else(|| "-".to_string(), |p| p.display().to_string());
        print_json(&json!({ "content_hash": hash, "input": input }))?;
    } else {
        println!("{hash}");
    }
    Ok(())
}
