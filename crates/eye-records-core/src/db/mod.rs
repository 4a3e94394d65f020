//! Database layer for eye records.

mod records;
mod row;
mod schema;
mod store;

pub use row::*;
pub use schema::*;
pub use store::*;

use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// How long a write waits for another connection to release the database lock.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed record store.
///
/// Every connection gets [`BUSY_TIMEOUT`] and the `patient_records` schema
/// before it is handed out, whether it points at a file or at memory.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the record file at `path`, creating it and its table if missing.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let path = path.as_ref();
        let db = Self::prepare(Connection::open(path)?)?;
        info!(path = %path.display(), "opened record database");
        Ok(db)
    }

    /// Private in-memory store. Records vanish when it is dropped.
    pub fn open_in_memory() -> DbResult<Self> {
        let db = Self::prepare(Connection::open_in_memory()?)?;
        debug!("opened in-memory record database");
        Ok(db)
    }

    fn prepare(conn: Connection) -> DbResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        // Fails here rather than on first query when the file is not SQLite
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Underlying connection, for queries the `RecordStore` API does not cover.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
