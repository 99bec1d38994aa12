//! SQLite snapshot store.
//!
//! Keeps fetched snapshots so a feed can be recomputed with different
//! parameters without fetching again. Timestamps are stored as epoch
//! milliseconds.

use chrono::{DateTime, Utc};
use pricefeed_core::{ms_to_datetime, Error, Result, Snapshot, Transaction};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, info};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS snapshots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        fetched_at_ms INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS transactions (
        snapshot_id INTEGER NOT NULL REFERENCES snapshots(id),
        sold_at_ms INTEGER NOT NULL,
        price REAL NOT NULL,
        sqft REAL NOT NULL,
        address TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_snapshot ON transactions(snapshot_id);
";

/// Summary row for a stored snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotInfo {
    pub id: i64,
    pub fetched_at: DateTime<Utc>,
    pub transaction_count: usize,
}

/// Snapshot store backed by SQLite.
pub struct SnapshotStore {
    conn: Connection,
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

fn to_datetime(ts_ms: i64) -> Result<DateTime<Utc>> {
    ms_to_datetime(ts_ms).ok_or_else(|| Error::data(format!("timestamp out of range: {ts_ms}")))
}

impl SnapshotStore {
    /// Open (or create) a store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(db_err)?;
        info!(path = %path.display(), "Opened snapshot store");
        Self::init(conn)
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory().map_err(db_err)?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(db_err)?;
        Ok(Self { conn })
    }

    /// Store a snapshot, returning its id.
    pub fn save(&mut self, snapshot: &Snapshot) -> Result<i64> {
        let tx = self.conn.transaction().map_err(db_err)?;

        tx.execute(
            "INSERT INTO snapshots (fetched_at_ms) VALUES (?1)",
            params![snapshot.fetched_at.timestamp_millis()],
        )
        .map_err(db_err)?;
        let id = tx.last_insert_rowid();

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO transactions (snapshot_id, sold_at_ms, price, sqft, address)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(db_err)?;

            for t in &snapshot.transactions {
                stmt.execute(params![id, t.sold_at.timestamp_millis(), t.price, t.sqft, t.address])
                    .map_err(db_err)?;
            }
        }

        tx.commit().map_err(db_err)?;
        debug!(id, transactions = snapshot.len(), "Saved snapshot");
        Ok(id)
    }

    /// Load a snapshot by id.
    pub fn load(&self, id: i64) -> Result<Option<Snapshot>> {
        let fetched_at_ms: Option<i64> = self
            .conn
            .query_row(
                "SELECT fetched_at_ms FROM snapshots WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;

        let Some(fetched_at_ms) = fetched_at_ms else {
            return Ok(None);
        };

        let mut stmt = self
            .conn
            .prepare(
                "SELECT sold_at_ms, price, sqft, address FROM transactions
                 WHERE snapshot_id = ?1 ORDER BY rowid",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(db_err)?;

        let mut transactions = Vec::new();
        for row in rows {
            let (sold_at_ms, price, sqft, address) = row.map_err(db_err)?;
            transactions.push(Transaction::new(to_datetime(sold_at_ms)?, price, sqft, address));
        }

        Ok(Some(Snapshot {
            fetched_at: to_datetime(fetched_at_ms)?,
            transactions,
        }))
    }

    /// Load the most recently saved snapshot.
    pub fn latest(&self) -> Result<Option<Snapshot>> {
        let id: Option<i64> = self
            .conn
            .query_row("SELECT MAX(id) FROM snapshots", [], |row| row.get(0))
            .map_err(db_err)?;

        match id {
            Some(id) => self.load(id),
            None => Ok(None),
        }
    }

    /// List stored snapshots, oldest first.
    pub fn list(&self) -> Result<Vec<SnapshotInfo>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT s.id, s.fetched_at_ms, COUNT(t.snapshot_id)
                 FROM snapshots s LEFT JOIN transactions t ON t.snapshot_id = s.id
                 GROUP BY s.id ORDER BY s.id",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
            })
            .map_err(db_err)?;

        let mut infos = Vec::new();
        for row in rows {
            let (id, fetched_at_ms, count) = row.map_err(db_err)?;
            infos.push(SnapshotInfo {
                id,
                fetched_at: to_datetime(fetched_at_ms)?,
                transaction_count: count as usize,
            });
        }
        Ok(infos)
    }
}
