use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::sync::Mutex;

use super::models::{WalletState, WALLET_STATE_ID};
use crate::error::AllocationError;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS wallet_state (
        id INTEGER PRIMARY KEY,
        derivation_index INTEGER NOT NULL DEFAULT 0
    );
    INSERT OR IGNORE INTO wallet_state (id, derivation_index) VALUES (1, 0);
";

/// Persisted derivation counter with exactly-once allocation.
///
/// The connection sits behind a mutex so only one read-then-advance runs at a
/// time in this process; the IMMEDIATE transaction and the conditional update
/// keep the row consistent against other writers on the same file.
pub struct IndexAllocator {
    conn: Mutex<Connection>,
}

impl IndexAllocator {
    /// Open (or create) the store at `path` and bootstrap the state row
    pub fn open(path: &Path) -> Result<Self, AllocationError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        log::info!("Opened derivation index store at {}", path.display());
        Self::with_connection(conn)
    }

    /// In-memory store, for tests
    pub fn open_in_memory() -> Result<Self, AllocationError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, AllocationError> {
        conn.execute_batch(SCHEMA)?;
        log::debug!("Bootstrapped wallet_state schema");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Hand out the next derivation index and advance the counter by one.
    ///
    /// The returned index is consumed even if the caller later fails to use it.
    pub fn allocate_next(&self) -> Result<u32, AllocationError> {
        let mut conn = self.conn.lock().map_err(|_| AllocationError::LockPoisoned)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let index = read_index(&tx)?;
        let next = index.checked_add(1).ok_or(AllocationError::Exhausted(i64::from(index) + 1))?;

        let updated = tx.execute(
            "UPDATE wallet_state SET derivation_index = ?1 WHERE id = ?2 AND derivation_index = ?3",
            params![next, WALLET_STATE_ID, index],
        )?;
        if updated != 1 {
            return Err(AllocationError::Conflict { expected: index });
        }

        tx.commit()?;
        log::debug!("Allocated derivation index {}", index);
        Ok(index)
    }

    /// Current counter value, i.e. the next index that will be handed out
    pub fn current_index(&self) -> Result<u32, AllocationError> {
        let conn = self.conn.lock().map_err(|_| AllocationError::LockPoisoned)?;
        read_index(&conn)
    }

    pub fn load_state(&self) -> Result<WalletState, AllocationError> {
        Ok(WalletState {
            derivation_index: self.current_index()?,
        })
    }
}

fn read_index(conn: &Connection) -> Result<u32, AllocationError> {
    let raw: Option<i64> = conn
        .query_row(
            "SELECT derivation_index FROM wallet_state WHERE id = ?1",
            [WALLET_STATE_ID],
            |row| row.get(0),
        )
        .optional()?;

    let raw = raw.ok_or(AllocationError::MissingState)?;
    u32::try_from(raw).map_err(|_| AllocationError::Exhausted(raw))
}
