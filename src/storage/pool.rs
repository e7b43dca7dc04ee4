//! Process-wide connection pool.
//!
//! One [`DbPool`] is opened at startup and handed (cloned) to every
//! [`MetadataStore`](super::MetadataStore). Connections are checked for
//! liveness on checkout; dead ones are dropped and replaced by the pool.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::config::DbConfig;
use crate::error::Result;

/// A connection checked out of a [`DbPool`].
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStatus {
    pub connections: u32,
    pub idle_connections: u32,
    pub max_size: u32,
}

/// Shared `SQLite` connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: r2d2::Pool<SqliteConnectionManager>,
    path: PathBuf,
}

impl fmt::Debug for DbPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbPool")
            .field("path", &self.path)
            .field("max_size", &self.inner.max_size())
            .finish_non_exhaustive()
    }
}

impl DbPool {
    /// Open the pool described by `config`.
    ///
    /// The database file is created if missing. At least one connection is
    /// established before this returns.
    ///
    /// # Errors
    ///
    /// Returns `Config` for unusable settings or `Pool` if no connection can
    /// be established within the connection timeout.
    pub fn open(config: &DbConfig) -> Result<Self> {
        config.validate()?;
        let path = config.database_path();
        let busy_timeout = config.busy_timeout();

        tracing::debug!(
            path = %path.display(),
            pool_size = config.pool_size,
            connection_timeout_ms = config.connection_timeout_ms,
            busy_timeout_ms = config.busy_timeout_ms,
            "opening database pool"
        );

        let manager = SqliteConnectionManager::file(&path)
            .with_init(move |conn| configure_connection(conn, busy_timeout));

        let inner = r2d2::Pool::builder()
            .max_size(config.pool_size)
            .min_idle(Some(1))
            .connection_timeout(config.connection_timeout())
            .test_on_check_out(true)
            .build(manager)?;

        tracing::info!(path = %path.display(), "database pool ready");
        Ok(Self { inner, path })
    }

    /// Check out a live connection.
    ///
    /// # Errors
    ///
    /// Returns `Pool` if no live connection is available before the
    /// connection timeout.
    pub fn get(&self) -> Result<PooledConnection> {
        Ok(self.inner.get()?)
    }

    /// Path of the database file behind this pool.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let state = self.inner.state();
        PoolStatus {
            connections: state.connections,
            idle_connections: state.idle_connections,
            max_size: self.inner.max_size(),
        }
    }

    /// Drain the pool at shutdown.
    ///
    /// Idle connections close when the last handle is dropped; connections
    /// still checked out close as they are returned.
    pub fn shutdown(self) {
        let status = self.status();
        tracing::info!(
            path = %self.path.display(),
            connections = status.connections,
            idle = status.idle_connections,
            "closing database pool"
        );
        drop(self.inner);
    }
}

fn configure_connection(conn: &mut Connection, busy_timeout: Duration) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    if !mode.eq_ignore_ascii_case("wal") {
        tracing::debug!(journal_mode = %mode, "WAL not available; keeping journal mode");
    }
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    Ok(())
}
