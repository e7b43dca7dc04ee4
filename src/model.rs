//! Core data types for `ingest_store`.
//!
//! These are the write-side shapes handed to
//! [`MetadataStore`](crate::storage::MetadataStore). Store-assigned columns
//! (`logged_at`, `fetched_at`) are deliberately absent: callers cannot set them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;
use crate::util::content_hash;

/// Outcome of the safety check applied to a fetched document.
///
/// Serde goes through [`FromStr`], so `"Rejected"` and `"rejected"` land on
/// the same variant either way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum SecurityStatus {
    #[default]
    Accepted,
    Rejected,
    Quarantined,
    Custom(String),
}

impl SecurityStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Quarantined => "quarantined",
            Self::Custom(value) => value.trim(),
        }
    }
}

impl TryFrom<String> for SecurityStatus {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SecurityStatus> for String {
    fn from(status: SecurityStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for SecurityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SecurityStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Err(StoreError::InvalidSecurityStatus {
                status: s.to_string(),
            }),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "quarantined" | "quarantine" => Ok(Self::Quarantined),
            _ => Ok(Self::Custom(trimmed.to_string())),
        }
    }
}

/// One entry for the append-only `ingestion_events` log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NewIngestionEvent {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl NewIngestionEvent {
    #[must_use]
    pub fn new(source: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            event_type: event_type.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_content_hash(mut self, content_hash: impl Into<String>) -> Self {
        self.content_hash = Some(content_hash.into());
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Metadata row for one raw fetched document.
///
/// At most one row per `(source, content_hash)` is ever stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NewRawDocument {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub security_status: SecurityStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_length: Option<u64>,
    pub content_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_path: Option<String>,
    #[serde(default)]
    pub payload_meta: Map<String, Value>,
}

impl NewRawDocument {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        security_status: SecurityStatus,
        content_hash: impl Into<String>,
        payload_meta: Map<String, Value>,
    ) -> Self {
        Self {
            source: source.into(),
            security_status,
            content_hash: content_hash.into(),
            payload_meta,
            ..Default::default()
        }
    }

    /// Build a row for `bytes`, deriving `content_hash` and `content_length`.
    #[must_use]
    pub fn from_bytes(
        source: impl Into<String>,
        security_status: SecurityStatus,
        bytes: &[u8],
        payload_meta: Map<String, Value>,
    ) -> Self {
        let mut doc = Self::new(source, security_status, content_hash(bytes), payload_meta);
        doc.content_length = u64::try_from(bytes.len()).ok();
        doc
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_rejection_reason(mut self, reason: impl Into<String>) -> Self {
        self.rejection_reason = Some(reason.into());
        self
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    #[must_use]
    pub const fn with_content_length(mut self, content_length: u64) -> Self {
        self.content_length = Some(content_length);
        self
    }

    /// Point at the blob stored outside the database.
    #[must_use]
    pub fn with_object(mut self, bucket: impl Into<String>, path: impl Into<String>) -> Self {
        self.object_bucket = Some(bucket.into());
        self.object_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::EMPTY_CONTENT_HASH;
    use serde_json::json;

    #[test]
    fn test_security_status_parse() {
        assert_eq!(
            "accepted".parse::<SecurityStatus>().unwrap(),
            SecurityStatus::Accepted
        );
        assert_eq!(
            " Rejected ".parse::<SecurityStatus>().unwrap(),
            SecurityStatus::Rejected
        );
        assert_eq!(
            "quarantine".parse::<SecurityStatus>().unwrap(),
            SecurityStatus::Quarantined
        );
        assert_eq!(
            "needs_review".parse::<SecurityStatus>().unwrap(),
            SecurityStatus::Custom("needs_review".to_string())
        );
        assert!("  ".parse::<SecurityStatus>().is_err());
    }

    #[test]
    fn test_security_status_serde() {
        let json = serde_json::to_string(&SecurityStatus::Quarantined).unwrap();
        assert_eq!(json, "\"quarantined\"");
        let custom: SecurityStatus = serde_json::from_str("\"held\"").unwrap();
        assert_eq!(custom, SecurityStatus::Custom("held".to_string()));
        assert_eq!(custom.as_str(), "held");
    }

    #[test]
    fn test_security_status_serde_matches_from_str() {
        let status: SecurityStatus = serde_json::from_str("\"Rejected\"").unwrap();
        assert_eq!(status, SecurityStatus::Rejected);
        assert_eq!(status, "Rejected".parse::<SecurityStatus>().unwrap());

        let custom: SecurityStatus = serde_json::from_str("\" held \"").unwrap();
        assert_eq!(custom, SecurityStatus::Custom("held".to_string()));
        assert!(serde_json::from_str::<SecurityStatus>("\"  \"").is_err());

        let padded = SecurityStatus::Custom(" held ".to_string());
        assert_eq!(padded.as_str(), "held");
        assert_eq!(serde_json::to_string(&padded).unwrap(), "\"held\"");
    }

    #[test]
    fn test_from_bytes_derives_hash_and_length() {
        let doc = NewRawDocument::from_bytes("web", SecurityStatus::Accepted, b"", Map::new());
        assert_eq!(doc.content_hash, EMPTY_CONTENT_HASH);
        assert_eq!(doc.content_length, Some(0));

        let doc = NewRawDocument::from_bytes("web", SecurityStatus::Accepted, b"doc", Map::new());
        assert_eq!(doc.content_hash, content_hash(b"doc"));
        assert_eq!(doc.content_length, Some(3));
    }

    #[test]
    fn test_builders_fill_optionals() {
        let mut meta = Map::new();
        meta.insert("title".to_string(), json!("t"));
        let doc = NewRawDocument::new("rss", SecurityStatus::Rejected, "h", meta)
            .with_url("http://x")
            .with_rejection_reason("malware")
            .with_content_type("text/html")
            .with_content_length(12)
            .with_object("raw", "rss/h");
        assert_eq!(doc.url.as_deref(), Some("http://x"));
        assert_eq!(doc.rejection_reason.as_deref(), Some("malware"));
        assert_eq!(doc.object_bucket.as_deref(), Some("raw"));
        assert_eq!(doc.object_path.as_deref(), Some("rss/h"));
        assert_eq!(doc.payload_meta["title"], json!("t"));

        let event = NewIngestionEvent::new("rss", "fetched")
            .with_url("http://x")
            .with_content_hash("h")
            .with_reason("ok");
        assert_eq!(event.reason.as_deref(), Some("ok"));
        assert_eq!(event.content_hash.as_deref(), Some("h"));
    }
}
