//! Shared handle to the index database and its scoped transaction guard.

use std::ops::Deref;
use std::path::{Path, PathBuf};

use medialib_core::MediaKind;
use parking_lot::{Mutex, MutexGuard};
use rusqlite::Connection;

use crate::operations::{self, OperationError};
use crate::schema::{self, SchemaError};

/// The index store: one connection serialized behind a mutex.
///
/// Other processes may open the same file; WAL mode and the busy timeout
/// set by [`schema::open_database`] let them share it.
pub struct IndexStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl IndexStore {
    pub fn open(path: &Path) -> Result<Self, SchemaError> {
        let conn = schema::open_database(path)?;
        log::debug!("Opened index store at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    pub fn open_memory() -> Result<Self, SchemaError> {
        Ok(Self {
            conn: Mutex::new(schema::open_memory()?),
            path: None,
        })
    }

    /// Database file path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lock the connection for autocommitted statements.
    ///
    /// Do not call while a [`TransactionGuard`] from this store is alive on
    /// the same thread; the mutex is not reentrant.
    pub fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    /// Begin an immediate write transaction.
    pub fn transaction(&self) -> Result<TransactionGuard<'_>, OperationError> {
        TransactionGuard::begin(self.conn.lock())
    }

    /// Issue the next unique number for `kind`.
    ///
    /// Runs in its own autocommitted statement so the number stays consumed
    /// even if the caller's transaction later rolls back.
    pub fn next_unique_number(&self, kind: MediaKind) -> Result<i64, OperationError> {
        let conn = self.conn.lock();
        operations::next_unique_number(&conn, kind)
    }
}

/// A write transaction that rolls back when dropped uncommitted.
///
/// Holds the store lock for its whole lifetime.
pub struct TransactionGuard<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl<'a> TransactionGuard<'a> {
    fn begin(conn: MutexGuard<'a, Connection>) -> Result<Self, OperationError> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self { conn })
    }

    pub fn is_active(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Commit the transaction. On failure the guard still rolls back on drop.
    pub fn commit(self) -> Result<(), OperationError> {
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }

    /// Roll back. Calling this on a finished transaction is a no-op.
    pub fn rollback(&mut self) -> Result<(), OperationError> {
        if !self.is_active() {
            return Ok(());
        }
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }
}

impl Deref for TransactionGuard<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.rollback() {
            log::warn!("Rollback failed: {}", e);
        }
    }
}
