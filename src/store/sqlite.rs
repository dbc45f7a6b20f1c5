use crate::core::{QuoteStore, StoreError, StoredQuote};
use async_trait::async_trait;
use rusqlite::{Connection, ErrorCode};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS cotacoes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        bid TEXT NOT NULL,
        timestamp DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
";

const INSERT_BID: &str = "INSERT INTO cotacoes (bid) VALUES (?1)";

const SELECT_RECENT: &str = "SELECT id, bid, timestamp FROM cotacoes ORDER BY id DESC LIMIT ?1";

// Number of VM instructions between deadline checks.
const PROGRESS_OPS: i32 = 100;

/// Append-only quote log on top of a single shared SQLite connection.
///
/// Statements run on the blocking pool. The connection is opened once and
/// reused by every request for the lifetime of the process.
#[derive(Clone)]
pub struct SqliteQuoteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteQuoteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref()).map_err(StoreError::Open)?;
        debug!("Opened database at {}", path.as_ref().display());
        Ok(Self::from_connection(conn))
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(StoreError::Open)?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        SqliteQuoteStore {
            conn: Arc::new(Mutex::new(conn)),
        }
    }
}

// A panic while holding the lock leaves the connection itself intact.
fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Inserts `bid` unless `expires_at` has already passed. A progress handler
/// aborts the statement at its next check after the deadline. The commit
/// itself is not checked, so a caller that already timed out may still see
/// its row land.
fn insert_bid(
    conn: &Mutex<Connection>,
    bid: &str,
    expires_at: Instant,
    deadline: Duration,
) -> Result<(), StoreError> {
    let conn = lock(conn);

    let remaining = expires_at
        .checked_duration_since(Instant::now())
        .filter(|d| !d.is_zero())
        .ok_or(StoreError::Timeout(deadline))?;
    conn.busy_timeout(remaining).map_err(StoreError::Execute)?;

    conn.progress_handler(PROGRESS_OPS, Some(move || Instant::now() >= expires_at));
    let result = execute_insert(&conn, bid);
    conn.progress_handler(0, None::<fn() -> bool>);

    result.map_err(|e| match e {
        StoreError::Execute(ref err) | StoreError::Prepare(ref err)
            if err.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) =>
        {
            StoreError::Timeout(deadline)
        }
        other => other,
    })
}

fn execute_insert(conn: &Connection, bid: &str) -> Result<(), StoreError> {
    let mut stmt = conn.prepare_cached(INSERT_BID).map_err(StoreError::Prepare)?;
    stmt.execute([bid]).map_err(StoreError::Execute)?;
    Ok(())
}

fn select_recent(conn: &Mutex<Connection>, limit: usize) -> Result<Vec<StoredQuote>, StoreError> {
    let conn = lock(conn);
    let mut stmt = conn
        .prepare_cached(SELECT_RECENT)
        .map_err(StoreError::Prepare)?;

    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    let rows = stmt
        .query_map([limit], |row| {
            Ok(StoredQuote {
                id: row.get(0)?,
                bid: row.get(1)?,
                timestamp: row.get(2)?,
            })
        })
        .map_err(StoreError::Query)?;

    rows.collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::Query)
}

#[async_trait]
impl QuoteStore for SqliteQuoteStore {
    fn ensure_schema(&self) -> Result<(), StoreError> {
        lock(&self.conn)
            .execute_batch(CREATE_TABLE)
            .map_err(StoreError::Schema)?;
        debug!("Table cotacoes is ready");
        Ok(())
    }

    async fn save_bid(&self, bid: &str, deadline: Duration) -> Result<(), StoreError> {
        let expires_at = Instant::now() + deadline;
        let conn = Arc::clone(&self.conn);
        let bid = bid.to_string();

        let task =
            tokio::task::spawn_blocking(move || insert_bid(&conn, &bid, expires_at, deadline));

        let outcome = tokio::time::timeout(deadline, task)
            .await
            .map_err(|_| StoreError::Timeout(deadline))?;
        outcome?
    }

    async fn recent(&self, limit: usize) -> Result<Vec<StoredQuote>, StoreError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || select_recent(&conn, limit)).await?
    }
}
