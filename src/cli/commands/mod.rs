//! Command implementations.

pub mod doctor;
pub mod hash;
pub mod init;
pub mod insert;
pub mod log_event;
pub mod version;

use serde::Serialize;

/// Print `value` as one line of JSON.
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
