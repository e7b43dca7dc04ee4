//! Error types for `ingest_store`.
//!
//! Failures split into two families: validation failures raised before any
//! write is attempted, and storage failures coming from the pool, the
//! connection or the statement itself. A dedup conflict on
//! `(source, content_hash)` is not an error and never shows up here.

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `ingest_store` operations.
#[derive(Error, Debug)]
pub enum StoreError {
    // === Validation Errors ===
    /// A single field failed validation.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Several fields failed validation.
    #[error("Validation errors: {errors:?}")]
    ValidationErrors { errors: Vec<ValidationError> },

    /// Unknown security status label where a known one was required.
    #[error("Invalid security status: {status}")]
    InvalidSecurityStatus { status: String },

    // === Storage Errors ===
    /// `SQLite` error from the underlying connection.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No connection could be checked out of the pool.
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Structured payload could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Storage error that does not map to a driver error.
    #[error("Storage error: {0}")]
    Storage(String),

    // === Configuration Errors ===
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file could not be parsed.
    #[error("Config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

impl StoreError {
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }

    /// True when the caller handed in bad input and nothing was written.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::ValidationErrors { .. }
                | Self::InvalidSecurityStatus { .. }
        )
    }

    /// True when the write failed in the pool, the connection or the engine.
    #[must_use]
    pub const fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Pool(_) | Self::Json(_) | Self::Storage(_)
        )
    }

    /// Names of the fields that failed validation, if any.
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<&str> {
        match self {
            Self::Validation { field, .. } => vec![field.as_str()],
            Self::ValidationErrors { errors } => errors.iter().map(|e| e.field.as_str()).collect(),
            _ => Vec::new(),
        }
    }
}

/// Result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
