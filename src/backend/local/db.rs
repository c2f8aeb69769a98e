// SPDX-License-Identifier: MPL-2.0

use crate::backend::BackendError;
use crate::backend::local::schema::SCHEMA;
use crate::config::APP_ID;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Handle to the local document database
#[derive(Clone)]
pub struct LocalDb {
    conn: Arc<Mutex<Connection>>,
}

impl LocalDb {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BackendError::Database(format!("failed to create data dir: {}", e))
            })?;
        }

        let conn = Connection::open(path)?;
        Self::migrate(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Database that lives only as long as this handle.
    pub fn open_in_memory() -> Result<Self, BackendError> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Default location: ~/.local/share/{APP_ID}/local.db
    pub fn default_path() -> Result<PathBuf, BackendError> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| BackendError::Database("could not find data directory".to_string()))?;

        Ok(data_dir.join(APP_ID).join("local.db"))
    }

    /// Run schema migrations (all CREATE IF NOT EXISTS)
    fn migrate(conn: &Connection) -> Result<(), BackendError> {
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    pub fn conn(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock leaves SQLite itself consistent
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current unix timestamp in milliseconds
    pub fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}
