//! `vigil-store` — durable record of scheduled jobs, price alerts, and the
//! recipient registry, backed by SQLite.
//!
//! The store is the single writer-of-record. The scheduler's in-memory
//! schedule is a disposable projection of the `scheduled_jobs` table and is
//! rebuilt from here on every startup; no job may exist only in memory
//! across a restart.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

pub mod alerts;
pub mod db;
pub mod error;
pub mod jobs;
pub mod recipients;
pub mod types;

pub use error::{Result, StoreError};
pub use types::{AlertDirection, PriceAlert, ScheduledJob};

/// Shared handle over one SQLite connection.
///
/// All mutations go through the inner mutex, so concurrent admin actions on
/// the same job id serialize — last write wins, and a job can never exist
/// twice.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Wrap a connection, initialising the schema if needed.
    pub fn new(conn: Connection) -> Result<Self> {
        db::init_db(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}
