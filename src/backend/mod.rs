// SPDX-License-Identifier: MPL-2.0

//! Capability contracts the client consumes: an auth provider, a document
//! store with live queries, and a blob store. Two implementations ship with
//! the crate: Firebase over REST and an embedded SQLite store.

mod error;
pub mod firebase;
pub mod local;
pub mod path;
mod query;
mod subscription;
mod update;

pub use error::{AuthErrorCode, BackendError, Operation, PermissionContext, StorageErrorCode};
pub use path::{CollectionPath, DocumentPath};
pub use query::{Direction, Filter, FilterOp, OrderBy, Query};
pub use subscription::{Snapshot, Subscription};
pub use update::{DocumentUpdate, FieldUpdate};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// A document as returned by the store: its id plus the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }

    /// Look up a field; dots descend into nested maps.
    pub fn field(&self, name: &str) -> Option<&Value> {
        name.split('.')
            .try_fold(&self.data, |value, segment| value.get(segment))
    }
}

/// Signed-in account as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, BackendError>;
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, BackendError>;
    async fn sign_out(&self) -> Result<(), BackendError>;
    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError>;
    /// Re-establish a persisted session, refreshing tokens where needed.
    async fn resume(&self, user: &AuthUser) -> Result<AuthUser, BackendError>;
    async fn current_user(&self) -> Option<AuthUser>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>, BackendError>;
    async fn query(&self, query: &Query) -> Result<Vec<Document>, BackendError>;
    /// Add a document with a generated id; returns the id.
    async fn add_document(
        &self,
        collection: &CollectionPath,
        data: Value,
    ) -> Result<String, BackendError>;
    /// Create or overwrite a document at a known path.
    async fn set_document(&self, path: &DocumentPath, data: Value) -> Result<(), BackendError>;
    /// Partial update; fails with `NotFound` if the document does not exist.
    async fn update_document(
        &self,
        path: &DocumentPath,
        update: DocumentUpdate,
    ) -> Result<(), BackendError>;
    async fn delete_document(&self, path: &DocumentPath) -> Result<(), BackendError>;

    /// Live query. The first snapshot arrives as soon as it is available.
    fn subscribe(&self, query: Query) -> Subscription;
    /// Live single document; snapshots hold zero or one documents.
    fn subscribe_document(&self, path: DocumentPath) -> Subscription;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload and return the public download URL.
    async fn upload_bytes(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError>;
    async fn download_url(&self, path: &str) -> Result<String, BackendError>;
}

/// The three capabilities bundled for injection at the composition root.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthProvider>,
    pub documents: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
}

impl Backend {
    pub fn firebase(config: firebase::FirebaseConfig) -> Self {
        let client = Arc::new(firebase::FirebaseClient::new(config));
        Self {
            auth: client.clone(),
            documents: client.clone(),
            blobs: client,
        }
    }

    pub fn local(store: local::LocalBackend) -> Self {
        let store = Arc::new(store);
        Self {
            auth: store.clone(),
            documents: store.clone(),
            blobs: store,
        }
    }
}
