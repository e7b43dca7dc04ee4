//! Validation helpers for `ingest_store`.
//!
//! These routines check required fields before a write is attempted and
//! return structured validation errors without touching storage.

use crate::error::{StoreError, ValidationError};
use crate::model::{NewIngestionEvent, NewRawDocument, SecurityStatus};
use crate::util::is_content_hash;

/// Validates ingestion log entries.
pub struct EventValidator;

impl EventValidator {
    /// Validate an event and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(event: &NewIngestionEvent) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        check_source(&event.source, &mut errors);

        if event.event_type.trim().is_empty() {
            errors.push(ValidationError::new("event_type", "cannot be empty"));
        }

        // Events may be logged before the hash exists, but not with a garbled one.
        if let Some(hash) = event.content_hash.as_deref() {
            check_content_hash(hash, &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Validates raw document metadata rows.
pub struct RawDocumentValidator;

impl RawDocumentValidator {
    /// Validate a raw document row and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(doc: &NewRawDocument) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        check_source(&doc.source, &mut errors);

        if matches!(&doc.security_status, SecurityStatus::Custom(label) if label.trim().is_empty()) {
            errors.push(ValidationError::new("security_status", "cannot be empty"));
        }

        check_content_hash(&doc.content_hash, &mut errors);

        // Stored as a signed 64-bit integer.
        if let Some(length) = doc.content_length {
            if i64::try_from(length).is_err() {
                errors.push(ValidationError::new(
                    "content_length",
                    "exceeds the storable range",
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Run [`EventValidator`] and fold its errors into a `StoreError`.
///
/// # Errors
///
/// Returns `Validation` or `ValidationErrors` when the event is invalid.
pub fn validate_event(event: &NewIngestionEvent) -> Result<(), StoreError> {
    EventValidator::validate(event).map_err(StoreError::from_validation_errors)
}

/// Run [`RawDocumentValidator`] and fold its errors into a `StoreError`.
///
/// # Errors
///
/// Returns `Validation` or `ValidationErrors` when the row is invalid.
pub fn validate_raw_document(doc: &NewRawDocument) -> Result<(), StoreError> {
    RawDocumentValidator::validate(doc).map_err(StoreError::from_validation_errors)
}

fn check_source(source: &str, errors: &mut Vec<ValidationError>) {
    if source.trim().is_empty() {
        errors.push(ValidationError::new("source", "cannot be empty"));
    }
}

fn check_content_hash(hash: &str, errors: &mut Vec<ValidationError>) {
    if hash.is_empty() {
        errors.push(ValidationError::new("content_hash", "cannot be empty"));
    } else if !is_content_hash(hash) {
        errors.push(ValidationError::new(
            "content_hash",
            "must be 64 lowercase hex characters (SHA-256)",
        ));
    }
}
