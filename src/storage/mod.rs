//! `SQLite` storage layer for `ingest_store`.
//!
//! This module provides the persistence layer using `SQLite` with:
//! - An `r2d2` pool that validates connections on checkout
//! - WAL mode and a busy timeout so concurrent writers queue instead of failing
//! - One statement per transaction, no transaction spans calls
//!
//! # Submodules
//!
//! - [`events`] - Append-only ingestion event log
//! - [`documents`] - Raw document metadata, deduplicated on `(source, content_hash)`
//! - [`pool`] - Process-wide connection pool
//! - [`schema`] - Bootstrap DDL and schema inspection
//! - [`store`] - [`MetadataStore`], the write facade

pub mod documents;
pub mod events;
pub mod pool;
pub mod schema;
pub mod store;

pub use documents::{RAW_DOCUMENTS_SCHEMA, init_raw_documents_table, insert_raw_document};
pub use events::{INGESTION_EVENTS_SCHEMA, init_ingestion_events_table, insert_ingestion_event};
pub use pool::{DbPool, PoolStatus, PooledConnection};
pub use schema::{SchemaReport, TableCheck, apply_schema, check_schema};
pub use store::MetadataStore;
