// SPDX-License-Identifier: MPL-2.0

/// SQL schema for the local document database
pub const SCHEMA: &str = r#"
PRAGMA user_version = 1;

-- documents: one row per document, body kept as JSON
CREATE TABLE IF NOT EXISTS documents (
    path TEXT PRIMARY KEY,
    parent TEXT NOT NULL,
    id TEXT NOT NULL,
    data TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_parent ON documents(parent);

-- blobs: uploaded images keyed by storage path
CREATE TABLE IF NOT EXISTS blobs (
    path TEXT PRIMARY KEY,
    content_type TEXT NOT NULL,
    data BLOB NOT NULL,
    size_bytes INTEGER NOT NULL,
    stored_at INTEGER NOT NULL
);
"#;
