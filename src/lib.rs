//! `ingest_store` - ingestion pipeline metadata store
//!
//! Records what happens to documents flowing through an ingestion pipeline:
//! an append-only event log, and one metadata row per raw document keyed on
//! `(source, content_hash)`. Writing the same document twice is a silent
//! no-op, so every ingestion path can record defensively.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`cli`] - Command-line interface using clap
//! - [`model`] - Write-side data types (events, raw documents, security status)
//! - [`storage`] - `SQLite` pool, tables and the [`MetadataStore`] facade
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling
//! - [`logging`] - Tracing subscriber setup
//! - [`util`] - Content hashing
//! - [`validation`] - Required-field checks run before every write
//!
//! # Quick Start
//!
//! ```no_run
//! use ingest_store::config::DbConfig;
//! use ingest_store::model::{NewIngestionEvent, NewRawDocument, SecurityStatus};
//! use ingest_store::storage::{DbPool, MetadataStore};
//! use serde_json::{Map, json};
//!
//! let pool = DbPool::open(&DbConfig::load(None).unwrap()).unwrap();
//! let store = MetadataStore::new(pool.clone());
//!
//! let body = b"<html>...</html>";
//! let mut meta = Map::new();
//! meta.insert("title".into(), json!("Front page"));
//! let doc = NewRawDocument::from_bytes("web", SecurityStatus::Accepted, body, meta)
//!     .with_url("https://example.org/");
//! store.insert_raw_metadata(&doc).unwrap();
//! store
//!     .log_ingestion_event(
//!         &NewIngestionEvent::new("web", "fetched").with_content_hash(&doc.content_hash),
//!     )
//!     .unwrap();
//!
//! pool.shutdown();
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod util;
pub mod validation;

pub use error::{Result, StoreError};
pub use model::{NewIngestionEvent, NewRawDocument, SecurityStatus};
pub use storage::{DbPool, MetadataStore};
pub use util::{ContentHasher, content_hash};

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if command execution fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
