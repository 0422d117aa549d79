//! Shared handler state and the blocking dispatch of service calls.
//!
//! # Invariants
//! - Every service call runs on the blocking pool, never on an async worker.
//! - Every service call is one transaction on the shared connection.

use bookshelf_core::{
    BookService, BookServiceError, DbHandle, ServiceResult, SqliteBookRepository,
};
use std::fmt::{Display, Formatter};

/// Failure of a dispatched service call.
#[derive(Debug)]
pub enum DispatchError {
    /// The service returned an error; the transaction was rolled back.
    Service(BookServiceError),
    /// The blocking worker panicked or was cancelled.
    Worker(String),
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{err}"),
            Self::Worker(message) => write!(f, "service worker failed: {message}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Service(err) => Some(err),
            Self::Worker(_) => None,
        }
    }
}

/// State cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    db: DbHandle,
}

impl AppState {
    pub fn new(db: DbHandle) -> Self {
        Self { db }
    }

    /// Runs `op` against a fresh service inside one `IMMEDIATE` transaction.
    ///
    /// The transaction commits only when `op` returns `Ok`.
    pub async fn run<T, F>(&self, op: F) -> Result<T, DispatchError>
    where
        T: Send + 'static,
        F: FnOnce(&BookService<SqliteBookRepository<'_>>) -> ServiceResult<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            db.with_transaction(|conn| {
                let repo = SqliteBookRepository::try_new(conn)?;
                op(&BookService::new(repo))
            })
        })
        .await
        .map_err(|err| DispatchError::Worker(err.to_string()))?
        .map_err(DispatchError::Service)
    }
}
