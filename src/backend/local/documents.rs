// SPDX-License-Identifier: MPL-2.0

use crate::backend::local::LocalDb;
use crate::backend::{BackendError, CollectionPath, Document, DocumentPath};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

/// Row-level operations on the documents table
pub struct DocumentTable<'a> {
    db: &'a LocalDb,
}

impl<'a> DocumentTable<'a> {
    pub fn new(db: &'a LocalDb) -> Self {
        Self { db }
    }

    pub fn get(&self, path: &DocumentPath) -> Result<Option<Document>, BackendError> {
        read(&self.db.conn(), path)
    }

    /// Every document directly inside `collection`, in insertion order.
    pub fn list(&self, collection: &CollectionPath) -> Result<Vec<Document>, BackendError> {
        let conn = self.db.conn();

        let mut stmt = conn.prepare(
            r#"
            SELECT id, data FROM documents
            WHERE parent = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )?;

        let mut rows = stmt.query([collection.as_str()])?;
        let mut docs = Vec::new();

        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let data: String = row.get(1)?;
            docs.push(Document::new(id, serde_json::from_str(&data)?));
        }

        Ok(docs)
    }

    /// Insert or replace a document body (upserts)
    pub fn put(&self, path: &DocumentPath, data: &Value) -> Result<(), BackendError> {
        write(&self.db.conn(), path, data)
    }

    /// Read, modify and write back a document body under one lock and one
    /// transaction. Returns `false` when the document does not exist.
    pub fn update<F>(&self, path: &DocumentPath, apply: F) -> Result<bool, BackendError>
    where
        F: FnOnce(&mut Value) -> Result<(), BackendError>,
    {
        let mut conn = self.db.conn();
        let tx = conn.transaction()?;

        let Some(mut doc) = read(&tx, path)? else {
            return Ok(false);
        };
        apply(&mut doc.data)?;
        write(&tx, path, &doc.data)?;

        tx.commit()?;
        Ok(true)
    }

    /// Returns whether a row was removed
    pub fn delete(&self, path: &DocumentPath) -> Result<bool, BackendError> {
        let conn = self.db.conn();
        let removed = conn.execute("DELETE FROM documents WHERE path = ?", [path.as_str()])?;
        Ok(removed > 0)
    }
}

fn read(conn: &Connection, path: &DocumentPath) -> Result<Option<Document>, BackendError> {
    let row = conn
        .query_row(
            "SELECT id, data FROM documents WHERE path = ?",
            [path.as_str()],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;

    match row {
        Some((id, data)) => Ok(Some(Document::new(id, serde_json::from_str(&data)?))),
        None => Ok(None),
    }
}

fn write(conn: &Connection, path: &DocumentPath, data: &Value) -> Result<(), BackendError> {
    conn.execute(
        r#"
        INSERT INTO documents (path, parent, id, data, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        ON CONFLICT(path) DO UPDATE SET
            data = excluded.data,
            updated_at = excluded.updated_at
        "#,
        params![
            path.as_str(),
            path.parent().as_str(),
            path.id(),
            serde_json::to_string(data)?,
            LocalDb::now(),
        ],
    )?;
    Ok(())
}
