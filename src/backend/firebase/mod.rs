// SPDX-License-Identifier: MPL-2.0

//! Firebase over plain REST: Identity Toolkit for auth, Firestore v1 for
//! documents, Firebase Storage for blobs.
//!
//! Firestore's streaming listen channel is not available over REST, so live
//! queries poll and only forward snapshots that changed.

mod auth;
pub mod codec;
mod firestore;
mod storage;

use crate::backend::{AuthUser, BackendError};
use crate::config::DEFAULT_POLL_INTERVAL_MS;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Web app credentials from the Firebase console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirebaseConfig {
    pub api_key: String,
    pub project_id: String,
    pub storage_bucket: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl FirebaseConfig {
    pub fn new(api_key: &str, project_id: &str, storage_bucket: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            project_id: project_id.to_string(),
            storage_bucket: storage_bucket.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

struct ClientInner {
    http: reqwest::Client,
    config: FirebaseConfig,
    session: RwLock<Option<AuthUser>>,
}

/// Cheap to clone; clones share the HTTP pool and the signed-in session.
#[derive(Clone)]
pub struct FirebaseClient {
    inner: Arc<ClientInner>,
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl FirebaseClient {
    pub fn new(config: FirebaseConfig) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http: reqwest::Client::new(),
                config,
                session: RwLock::new(None),
            }),
        }
    }

    fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    fn config(&self) -> &FirebaseConfig {
        &self.inner.config
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.inner.config.poll_interval_ms.max(250))
    }

    fn session(&self) -> Option<AuthUser> {
        self.inner
            .session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_session(&self, user: Option<AuthUser>) {
        let mut guard = self.inner.session.write().unwrap_or_else(|e| e.into_inner());
        *guard = user;
    }

    fn id_token(&self) -> Option<String> {
        self.session().and_then(|s| s.id_token)
    }

    /// Attach the bearer token when signed in; anonymous reads are left to
    /// the security rules.
    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.id_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Parse an error response body, tolerating non-JSON bodies.
async fn api_error(response: reqwest::Response) -> (u16, String, Option<String>) {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiErrorBody>(&text) {
        Ok(body) => (status, body.error.message, body.error.status),
        Err(_) => (status, text, None),
    }
}

fn invalid(e: impl std::fmt::Display) -> BackendError {
    BackendError::InvalidResponse(e.to_string())
}
