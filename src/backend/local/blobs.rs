// SPDX-License-Identifier: MPL-2.0

use crate::backend::BackendError;
use crate::backend::local::LocalDb;
use rusqlite::{OptionalExtension, params};

/// Maximum size of a single stored blob (5MB)
pub const MAX_BLOB_BYTES: usize = 5 * 1024 * 1024;

/// Stored blob with metadata
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Blob storage in the blobs table
pub struct BlobTable<'a> {
    db: &'a LocalDb,
}

impl<'a> BlobTable<'a> {
    pub fn new(db: &'a LocalDb) -> Self {
        Self { db }
    }

    pub fn put(&self, path: &str, data: &[u8], content_type: &str) -> Result<(), BackendError> {
        let conn = self.db.conn();

        conn.execute(
            r#"
            INSERT INTO blobs (path, content_type, data, size_bytes, stored_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(path) DO UPDATE SET
                content_type = excluded.content_type,
                data = excluded.data,
                size_bytes = excluded.size_bytes,
                stored_at = excluded.stored_at
            "#,
            params![path, content_type, data, data.len() as i64, LocalDb::now()],
        )?;

        Ok(())
    }

    pub fn get(&self, path: &str) -> Result<Option<StoredBlob>, BackendError> {
        let conn = self.db.conn();

        let blob = conn
            .query_row(
                "SELECT data, content_type FROM blobs WHERE path = ?",
                [path],
                |row| {
                    Ok(StoredBlob {
                        data: row.get(0)?,
                        content_type: row.get(1)?,
                    })
                },
            )
            .optional()?;

        Ok(blob)
    }

    pub fn exists(&self, path: &str) -> Result<bool, BackendError> {
        let conn = self.db.conn();
        let mut stmt = conn.prepare("SELECT 1 FROM blobs WHERE path = ?")?;
        Ok(stmt.exists([path])?)
    }
}
