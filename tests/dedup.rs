mod common;

use chrono::{DateTime, Duration, Utc};
use common::TestStore;
use ingest_store::model::{NewIngestionEvent, NewRawDocument, SecurityStatus};
use ingest_store::util::{EMPTY_CONTENT_HASH, content_hash};
use serde_json::{Map, Value, json};

fn meta(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object")
}

#[test]
fn same_source_and_hash_stored_once() {
    let t = TestStore::new();
    let h = content_hash(b"rss item");
    let doc = NewRawDocument::new("rss", SecurityStatus::Accepted, h.clone(), Map::new());

    t.store.insert_raw_metadata(&doc).unwrap();
    t.store.insert_raw_metadata(&doc).unwrap();

    let rows: i64 = t
        .conn()
        .query_row(
            "SELECT COUNT(*) FROM raw_documents WHERE source = 'rss' AND content_hash = ?1",
            [&h],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn duplicate_does_not_overwrite_first_row() {
    let t = TestStore::new();
    let first = NewRawDocument::from_bytes(
        "web",
        SecurityStatus::Accepted,
        b"page",
        meta(json!({"attempt": 1})),
    )
    .with_url("http://a");
    let second = NewRawDocument::from_bytes(
        "web",
        SecurityStatus::Quarantined,
        b"page",
        meta(json!({"attempt": 2})),
    )
    .with_url("http://b")
    .with_rejection_reason("late scan");

    t.store.insert_raw_metadata(&first).unwrap();
    t.store.insert_raw_metadata(&second).unwrap();

    let (url, status, reason, attempt): (String, String, Option<String>, i64) = t
        .conn()
        .query_row(
            "SELECT url, security_status, rejection_reason, json_extract(payload_meta, '$.attempt') \
             FROM raw_documents",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!(url, "http://a");
    assert_eq!(status, "accepted");
    assert!(reason.is_none());
    assert_eq!(attempt, 1);
}

#[test]
fn same_hash_different_source_gives_two_rows() {
    let t = TestStore::new();
    let h = content_hash(b"shared body");
    for source in ["rss", "web"] {
        let doc = NewRawDocument::new(source, SecurityStatus::Accepted, h.clone(), Map::new());
        t.store.insert_raw_metadata(&doc).unwrap();
    }
    assert_eq!(t.count("raw_documents"), 2);
}

#[test]
fn identical_events_are_all_logged() {
    let t = TestStore::new();
    let event = NewIngestionEvent::new("rss", "duplicate_fetch")
        .with_url("http://x")
        .with_content_hash(content_hash(b"x"))
        .with_reason("already seen");
    for _ in 0..5 {
        t.store.log_ingestion_event(&event).unwrap();
    }
    assert_eq!(t.count("ingestion_events"), 5);
}

#[test]
fn event_without_hash_or_url_is_logged() {
    let t = TestStore::new();
    let event = NewIngestionEvent::new("crawler", "rejected").with_reason("robots.txt");
    t.store.log_ingestion_event(&event).unwrap();

    let (hash, url): (Option<String>, Option<String>) = t
        .conn()
        .query_row("SELECT content_hash, url FROM ingestion_events", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert!(hash.is_none());
    assert!(url.is_none());
}

#[test]
fn missing_required_field_writes_nothing() {
    let t = TestStore::new();
    let doc = NewRawDocument::new("rss", SecurityStatus::Accepted, "", Map::new());
    let err = t.store.insert_raw_metadata(&doc).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.invalid_fields(), vec!["content_hash"]);

    let doc = NewRawDocument::new("", SecurityStatus::Accepted, EMPTY_CONTENT_HASH, Map::new());
    assert!(t.store.insert_raw_metadata(&doc).unwrap_err().is_validation());

    let event = NewIngestionEvent::new("rss", " ");
    assert!(t.store.log_ingestion_event(&event).unwrap_err().is_validation());

    assert_eq!(t.count("raw_documents"), 0);
    assert_eq!(t.count("ingestion_events"), 0);
}

#[test]
fn long_source_and_labels_are_stored() {
    let t = TestStore::new();
    let source = "s".repeat(500);
    let doc = NewRawDocument::from_bytes(
        source.clone(),
        SecurityStatus::Custom("é".repeat(60)),
        b"long source",
        Map::new(),
    );
    t.store.insert_raw_metadata(&doc).unwrap();

    let event = NewIngestionEvent::new(source, "é".repeat(60));
    t.store.log_ingestion_event(&event).unwrap();

    let (stored_source, status): (String, String) = t
        .conn()
        .query_row(
            "SELECT source, security_status FROM raw_documents",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(stored_source.chars().count(), 500);
    assert_eq!(status, "é".repeat(60));
    assert_eq!(t.count("ingestion_events"), 1);
}

#[test]
fn end_to_end_row_shape() {
    let t = TestStore::new();
    let before = Utc::now();
    let doc = NewRawDocument::new(
        "web",
        SecurityStatus::Accepted,
        content_hash(b"doc"),
        meta(json!({"title": "t"})),
    )
    .with_url("http://x");
    t.store.insert_raw_metadata(&doc).unwrap();
    let after = Utc::now();

    let (source, url, status, hash, fetched_at, kind, payload): (
        String,
        String,
        String,
        String,
        String,
        String,
        String,
    ) = t
        .conn()
        .query_row(
            "SELECT source, url, security_status, content_hash, fetched_at, \
             json_type(payload_meta), payload_meta FROM raw_documents",
            [],
            |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                ))
            },
        )
        .unwrap();

    assert_eq!(source, "web");
    assert_eq!(url, "http://x");
    assert_eq!(status, "accepted");
    assert_eq!(hash, content_hash(b"doc"));

    let fetched_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&fetched_at)
        .unwrap()
        .with_timezone(&Utc);
    assert!(fetched_at >= before - Duration::seconds(1));
    assert!(fetched_at <= after + Duration::seconds(1));

    assert_eq!(kind, "object");
    let parsed: Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(parsed, json!({"title": "t"}));
}

#[test]
fn logged_at_is_assigned_by_store() {
    let t = TestStore::new();
    let before = Utc::now();
    t.store
        .log_ingestion_event(&NewIngestionEvent::new("rss", "fetched"))
        .unwrap();
    let logged_at: String = t
        .conn()
        .query_row("SELECT logged_at FROM ingestion_events", [], |row| row.get(0))
        .unwrap();
    let logged_at = DateTime::parse_from_rfc3339(&logged_at)
        .unwrap()
        .with_timezone(&Utc);
    assert!((logged_at - before).num_seconds().abs() <= 5);
}
