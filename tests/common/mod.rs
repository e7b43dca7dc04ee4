#![allow(dead_code)]

pub mod cli;

use ingest_store::config::DbConfig;
use ingest_store::storage::{DbPool, MetadataStore, apply_schema};
use rusqlite::Connection;
use tempfile::TempDir;

/// A store on a fresh, initialized database in a temp dir.
pub struct TestStore {
    pub dir: TempDir,
    pub pool: DbPool,
    pub store: MetadataStore,
}

impl TestStore {
    pub fn new() -> Self {
        Self::with_pool_size(4)
    }

    pub fn with_pool_size(pool_size: u32) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let config = DbConfig {
            pool_size,
            busy_timeout_ms: 10_000,
            ..DbConfig::default()
        }
        .with_path(dir.path().join("ingest.db"));
        let pool = DbPool::open(&config).expect("open pool");
        apply_schema(&pool.get().expect("checkout")).expect("schema");
        let store = MetadataStore::new(pool.clone());
        Self { dir, pool, store }
    }

    /// A plain connection for asserting on table contents.
    pub fn conn(&self) -> Connection {
        Connection::open(self.pool.path()).expect("open db")
    }

    pub fn count(&self, table: &str) -> i64 {
        self.conn()
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
            .expect("count")
    }
}
