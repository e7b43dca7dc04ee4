//! The write facade used by the ingestion pipeline.

use chrono::Utc;
use rusqlite::TransactionBehavior;

use super::documents::insert_raw_document;
use super::events::insert_ingestion_event;
use super::pool::DbPool;
use crate::error::Result;
use crate::model::{NewIngestionEvent, NewRawDocument};
use crate::validation::{validate_event, validate_raw_document};

/// Records ingestion events and raw document metadata.
///
/// Cheap to clone and safe to share across threads. Every call checks out
/// one pooled connection and runs a single statement in its own
/// transaction; nothing is held open between calls.
#[derive(Debug, Clone)]
pub struct MetadataStore {
    pool: DbPool,
}

impl MetadataStore {
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub const fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Release this store's pool handle, draining the pool if it was the last.
    pub fn shutdown(self) {
        self.pool.shutdown();
    }

    /// Append one entry to the ingestion event log.
    ///
    /// Identical events are all kept; the log has no key.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `source` or `event_type` is blank or a
    /// supplied `content_hash` is malformed (nothing is written), or a
    /// storage error if the pool or the insert fails (nothing is written).
    pub fn log_ingestion_event(&self, event: &NewIngestionEvent) -> Result<()> {
        validate_event(event)?;

        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let id = insert_ingestion_event(&tx, event)?;
        tx.commit()?;

        tracing::debug!(
            id,
            source = %event.source,
            event_type = %event.event_type,
            "ingestion event logged"
        );
        Ok(())
    }

    /// Record metadata for a raw fetched document.
    ///
    /// `fetched_at` is stamped here with the current UTC time. If a row with
    /// the same `(source, content_hash)` already exists the call is a silent
    /// no-op: the stored row is left untouched and `Ok(())` is returned.
    ///
    /// No ingestion event is written; call [`Self::log_ingestion_event`]
    /// separately when one is wanted.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is missing or
    /// malformed (nothing is written), or a storage error if the pool, the
    /// payload serialization or the insert fails (nothing is written).
    pub fn insert_raw_metadata(&self, doc: &NewRawDocument) -> Result<()> {
        validate_raw_document(doc)?;

        let fetched_at = Utc::now();
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let inserted = insert_raw_document(&tx, doc, fetched_at)?;
        tx.commit()?;

        tracing::debug!(
            source = %doc.source,
            content_hash = %doc.content_hash,
            security_status = %doc.security_status,
            deduplicated = !inserted,
            "raw document metadata recorded"
        );
        Ok(())
    }
}
