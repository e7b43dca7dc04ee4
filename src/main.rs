//! `ingest_store` (istore) - ingestion metadata store
//!
//! Thin operator CLI over the library: hash documents, append ingestion
//! events, record raw document metadata, and check the database schema.

use ingest_store::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
