pub mod content;
pub mod engagements;
pub mod error;
pub mod migrations;
pub mod models;
pub mod subscriptions;
pub mod users;

use rusqlite::{Connection, OpenFlags, TransactionBehavior};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

pub use error::{StoreError, StoreResult, expect_one};

pub const DEFAULT_READER_POOL_SIZE: usize = 4;

/// SQLite keeps at most 999 host parameters per statement on older builds.
const MAX_KEYS_PER_QUERY: usize = 500;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// One writer connection plus a round-robin pool of read-only connections.
/// All writes funnel through the writer mutex, reads never wait on it.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
}

impl Database {
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_with_readers(path, DEFAULT_READER_POOL_SIZE)
    }

    pub fn open_with_readers(path: &Path, reader_pool_size: usize) -> StoreResult<Self> {
        let writer = Connection::open(path)?;

        // WAL mode for concurrent reads
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.pragma_update(None, "foreign_keys", "ON")?;
        writer.busy_timeout(BUSY_TIMEOUT)?;

        migrations::run(&writer)?;

        let mut readers = Vec::with_capacity(reader_pool_size);
        for _ in 0..reader_pool_size {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            readers.push(Mutex::new(conn));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            path.display(),
            reader_pool_size
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
        })
    }

    /// Run a read on the next reader connection. Falls back to the writer
    /// when the pool is empty.
    pub fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        if self.readers.is_empty() {
            return self.with_conn_mut(f);
        }

        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|e| StoreError::LockPoisoned(format!("reader: {}", e)))?;
        f(&conn)
    }

    pub fn with_conn_mut<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self
            .writer
            .lock()
            .map_err(|e| StoreError::LockPoisoned(format!("writer: {}", e)))?;
        f(&conn)
    }

    /// Run `f` inside a `BEGIN IMMEDIATE` transaction on the writer.
    /// Commits when `f` returns Ok, rolls back otherwise.
    pub fn with_tx<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let mut conn = self
            .writer
            .lock()
            .map_err(|e| StoreError::LockPoisoned(format!("writer: {}", e)))?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&*tx)?;
        tx.commit()?;
        Ok(out)
    }
}

/// Run `SELECT ... IN (...)` over `keys` in batches.
///
/// `sql` must contain exactly one `{keys}` marker where the placeholder list
/// goes. `leading` params are bound first as `?1..?n`; key placeholders are
/// numbered after them.
pub(crate) fn query_by_keys<T, F>(
    conn: &Connection,
    sql: &str,
    leading: &[String],
    keys: &[Uuid],
    mut map: F,
) -> StoreResult<Vec<T>>
where
    F: FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
{
    let mut out = Vec::new();
    if keys.is_empty() {
        return Ok(out);
    }

    for chunk in keys.chunks(MAX_KEYS_PER_QUERY) {
        let first = leading.len() + 1;
        let placeholders: Vec<String> = (first..first + chunk.len())
            .map(|i| format!("?{}", i))
            .collect();
        let stmt_sql = sql.replace("{keys}", &placeholders.join(", "));

        let mut params: Vec<String> = leading.to_vec();
        params.extend(chunk.iter().map(Uuid::to_string));

        let mut stmt = conn.prepare(&stmt_sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), &mut map)?;
        for row in rows {
            out.push(row?);
        }
    }

    Ok(out)
}

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
    fn optional(self) -> StoreResult<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> StoreResult<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
