// SPDX-License-Identifier: MPL-2.0

//! Embedded backend: documents and blobs in SQLite, accounts in memory.
//!
//! Used for offline development and tests. Live queries are driven by a
//! change broadcast, so a write is visible to every subscription on the same
//! collection without polling. Faults (denied paths, going offline) can be
//! injected to exercise the client's error paths.

mod blobs;
mod db;
mod documents;
mod schema;

pub use blobs::{BlobTable, MAX_BLOB_BYTES, StoredBlob};
pub use db::LocalDb;
pub use documents::DocumentTable;

use crate::backend::{
    AuthErrorCode, AuthProvider, AuthUser, BackendError, BlobStore, CollectionPath, Document,
    DocumentPath, DocumentStore, DocumentUpdate, Operation, PermissionContext, Query,
    StorageErrorCode, Subscription,
};
use crate::runtime;
use async_trait::async_trait;
use email_address::EmailAddress;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tracing::debug;
use uuid::Uuid;

/// Which side of a path an injected denial applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
    All,
}

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    email: String,
    password: String,
}

#[derive(Default)]
struct LocalState {
    accounts: HashMap<String, Account>,
    current: Option<AuthUser>,
    password_resets: Vec<String>,
    denied: Vec<(String, Access)>,
    offline: bool,
}

#[derive(Clone)]
pub struct LocalBackend {
    db: LocalDb,
    state: Arc<Mutex<LocalState>>,
    changes: broadcast::Sender<String>,
}

impl LocalBackend {
    pub fn new(db: LocalDb) -> Self {
        let (changes, _) = broadcast::channel(256);
        Self {
            db,
            state: Arc::new(Mutex::new(LocalState::default())),
            changes,
        }
    }

    pub fn in_memory() -> Result<Self, BackendError> {
        Ok(Self::new(LocalDb::open_in_memory()?))
    }

    pub fn open(path: &Path) -> Result<Self, BackendError> {
        Ok(Self::new(LocalDb::open(path)?))
    }

    fn state(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Refuse operations on paths starting with `prefix`.
    pub fn deny(&self, prefix: &str, access: Access) {
        self.state().denied.push((prefix.to_string(), access));
        self.notify_all();
    }

    pub fn allow_all(&self) {
        self.state().denied.clear();
        self.notify_all();
    }

    /// While offline every call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Emails that asked for a password reset, oldest first.
    pub fn password_resets(&self) -> Vec<String> {
        self.state().password_resets.clone()
    }

    fn is_denied(&self, path: &str, write: bool) -> bool {
        self.state().denied.iter().any(|(prefix, access)| {
            let applies = match access {
                Access::All => true,
                Access::Read => !write,
                Access::Write => write,
            };
            applies && path.starts_with(prefix.as_str())
        })
    }

    fn check(
        &self,
        path: &str,
        operation: Operation,
        payload: Option<&Value>,
    ) -> Result<(), BackendError> {
        if self.state().offline {
            return Err(BackendError::Network("backend unreachable".to_string()));
        }
        let write = !matches!(operation, Operation::Get | Operation::List);
        if self.is_denied(path, write) {
            let mut ctx = PermissionContext::new(path, operation);
            if let Some(payload) = payload {
                ctx = ctx.with_payload(payload.clone());
            }
            return Err(BackendError::PermissionDenied(ctx));
        }
        Ok(())
    }

    fn notify(&self, collection: &CollectionPath) {
        // No receivers just means no live queries right now
        let _ = self.changes.send(collection.as_str().to_string());
    }

    /// Wake every subscription, e.g. after fault rules changed.
    fn notify_all(&self) {
        let _ = self.changes.send(String::new());
    }

    fn run_query(&self, query: &Query) -> Result<Vec<Document>, BackendError> {
        self.check(query.collection.as_str(), Operation::List, None)?;
        let docs = DocumentTable::new(&self.db).list(&query.collection)?;
        Ok(query.apply(docs))
    }

    fn read_document(&self, path: &DocumentPath) -> Result<Option<Document>, BackendError> {
        self.check(path.as_str(), Operation::Get, None)?;
        DocumentTable::new(&self.db).get(path)
    }

    fn new_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Re-run `fetch` on every change to `collection`, forwarding snapshots
    /// that differ from the previous one.
    fn live<F>(&self, collection: CollectionPath, fetch: F) -> Subscription
    where
        F: Fn(&LocalBackend) -> Result<Vec<Document>, BackendError> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend = self.clone();
        let mut changes = self.changes.subscribe();

        let producer = runtime::spawn(async move {
            let mut last: Option<Vec<Document>> = None;
            loop {
                let snapshot = fetch(&backend);
                let changed = match (&snapshot, &last) {
                    (Ok(docs), Some(prev)) => docs != prev,
                    _ => true,
                };
                if changed {
                    last = snapshot.as_ref().ok().cloned();
                    if tx.send(snapshot).is_err() {
                        return;
                    }
                }

                loop {
                    match changes.recv().await {
                        Ok(changed) if changed.is_empty() || changed == collection.as_str() => {
                            break;
                        }
                        Ok(_) => continue,
                        Err(RecvError::Lagged(_)) => break,
                        Err(RecvError::Closed) => return,
                    }
                }
            }
        });

        Subscription::new(rx, producer)
    }
}

#[async_trait]
impl DocumentStore for LocalBackend {
    async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>, BackendError> {
        self.read_document(path)
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, BackendError> {
        self.run_query(query)
    }

    async fn add_document(
        &self,
        collection: &CollectionPath,
        data: Value,
    ) -> Result<String, BackendError> {
        let id = Self::new_id();
        let path = collection.doc(&id);
        self.check(path.as_str(), Operation::Create, Some(&data))?;

        DocumentTable::new(&self.db).put(&path, &data)?;
        debug!(path = %path, "document added");
        self.notify(collection);
        Ok(id)
    }

    async fn set_document(&self, path: &DocumentPath, data: Value) -> Result<(), BackendError> {
        self.check(path.as_str(), Operation::Create, Some(&data))?;

        DocumentTable::new(&self.db).put(path, &data)?;
        self.notify(&path.parent());
        Ok(())
    }

    async fn update_document(
        &self,
        path: &DocumentPath,
        update: DocumentUpdate,
    ) -> Result<(), BackendError> {
        self.check(path.as_str(), Operation::Update, Some(&update.describe()))?;

        let found = DocumentTable::new(&self.db).update(path, |data| {
            let Value::Object(body) = data else {
                return Err(BackendError::InvalidResponse(format!(
                    "document {} is not an object",
                    path
                )));
            };
            update.apply_to(body);
            Ok(())
        })?;
        if !found {
            return Err(BackendError::NotFound(path.to_string()));
        }

        self.notify(&path.parent());
        Ok(())
    }

    async fn delete_document(&self, path: &DocumentPath) -> Result<(), BackendError> {
        self.check(path.as_str(), Operation::Delete, None)?;

        // Deleting a missing document succeeds, as in Firestore
        if DocumentTable::new(&self.db).delete(path)? {
            self.notify(&path.parent());
        }
        Ok(())
    }

    fn subscribe(&self, query: Query) -> Subscription {
        let collection = query.collection.clone();
        self.live(collection, move |backend| backend.run_query(&query))
    }

    fn subscribe_document(&self, path: DocumentPath) -> Subscription {
        self.live(path.parent(), move |backend| {
            backend
                .read_document(&path)
                .map(|doc| doc.into_iter().collect())
        })
    }
}

#[async_trait]
impl AuthProvider for LocalBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, BackendError> {
        let mut state = self.state();
        if state.offline {
            return Err(BackendError::Auth(AuthErrorCode::NetworkRequestFailed));
        }
        if !EmailAddress::is_valid(email) {
            return Err(BackendError::Auth(AuthErrorCode::InvalidEmail));
        }
        if password.chars().count() < 6 {
            return Err(BackendError::Auth(AuthErrorCode::WeakPassword));
        }
        let key = email.to_lowercase();
        if state.accounts.contains_key(&key) {
            return Err(BackendError::Auth(AuthErrorCode::EmailAlreadyInUse));
        }

        let account = Account {
            uid: Self::new_id(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let user = AuthUser {
            uid: account.uid.clone(),
            email: account.email.clone(),
            id_token: None,
            refresh_token: None,
        };
        state.accounts.insert(key, account);
        state.current = Some(user.clone());
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, BackendError> {
        let mut state = self.state();
        if state.offline {
            return Err(BackendError::Auth(AuthErrorCode::NetworkRequestFailed));
        }
        let account = state
            .accounts
            .get(&email.to_lowercase())
            .cloned()
            .ok_or(BackendError::Auth(AuthErrorCode::UserNotFound))?;
        if account.password != password {
            return Err(BackendError::Auth(AuthErrorCode::WrongPassword));
        }

        let user = AuthUser {
            uid: account.uid.clone(),
            email: account.email.clone(),
            id_token: None,
            refresh_token: None,
        };
        state.current = Some(user.clone());
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.state().current = None;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError> {
        let mut state = self.state();
        if state.offline {
            return Err(BackendError::Auth(AuthErrorCode::NetworkRequestFailed));
        }
        if !EmailAddress::is_valid(email) {
            return Err(BackendError::Auth(AuthErrorCode::InvalidEmail));
        }
        if !state.accounts.contains_key(&email.to_lowercase()) {
            return Err(BackendError::Auth(AuthErrorCode::UserNotFound));
        }
        state.password_resets.push(email.to_string());
        Ok(())
    }

    async fn resume(&self, user: &AuthUser) -> Result<AuthUser, BackendError> {
        let mut state = self.state();
        let known = state.accounts.values().any(|a| a.uid == user.uid);
        if !known {
            return Err(BackendError::Auth(AuthErrorCode::UserNotFound));
        }
        state.current = Some(user.clone());
        Ok(user.clone())
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.state().current.clone()
    }
}

#[async_trait]
impl BlobStore for LocalBackend {
    async fn upload_bytes(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        if self.state().offline {
            return Err(BackendError::Network("backend unreachable".to_string()));
        }
        if self.is_denied(path, true) {
            return Err(BackendError::Storage {
                code: StorageErrorCode::Unauthorized,
                message: format!("upload to {} refused", path),
            });
        }
        if bytes.len() > MAX_BLOB_BYTES {
            return Err(BackendError::Storage {
                code: StorageErrorCode::QuotaExceeded,
                message: format!("{} bytes exceeds the upload limit", bytes.len()),
            });
        }

        BlobTable::new(&self.db).put(path, &bytes, content_type)?;
        Ok(format!("local://{}", path))
    }

    async fn download_url(&self, path: &str) -> Result<String, BackendError> {
        if !BlobTable::new(&self.db).exists(path)? {
            return Err(BackendError::Storage {
                code: StorageErrorCode::ObjectNotFound,
                message: format!("no object at {}", path),
            });
        }
        Ok(format!("local://{}", path))
    }
}
