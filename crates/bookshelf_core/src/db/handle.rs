//! Process-lifetime connection handle.
//!
//! # Responsibility
//! - Share one migrated SQLite connection between request workers.
//! - Run each business operation inside a single write transaction.
//!
//! # Invariants
//! - Statements on the shared connection are serialized by the mutex.
//! - `with_transaction` commits only when the closure returns `Ok`.

use super::DbError;
use rusqlite::{Connection, TransactionBehavior};
use std::sync::{Arc, Mutex};

/// Cloneable handle to the shared, migrated connection.
#[derive(Clone)]
pub struct DbHandle {
    conn: Arc<Mutex<Connection>>,
}

impl DbHandle {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs `f` inside an `IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front, so a check-then-mutate sequence in
    /// `f` cannot interleave with another writer. Returning `Err` from `f`
    /// rolls the transaction back.
    pub fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<DbError>,
    {
        let mut guard = self.conn.lock().map_err(|_| DbError::ConnectionPoisoned)?;
        let tx = guard
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DbError::from)?;

        let value = f(&*tx)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }
}
