// SPDX-License-Identifier: MPL-2.0

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Kind of document operation, carried with permission errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Get,
    List,
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Get => "get",
            Operation::List => "list",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// What was attempted when the backend refused a document operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PermissionContext {
    pub path: String,
    pub operation: Operation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl PermissionContext {
    pub fn new(path: impl Into<String>, operation: Operation) -> Self {
        Self {
            path: path.into(),
            operation,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Auth provider error codes, in the provider's own taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    UserNotFound,
    WrongPassword,
    InvalidCredential,
    EmailAlreadyInUse,
    WeakPassword,
    InvalidEmail,
    TooManyRequests,
    UserDisabled,
    NetworkRequestFailed,
    Other(String),
}

impl AuthErrorCode {
    pub fn code(&self) -> &str {
        match self {
            AuthErrorCode::UserNotFound => "auth/user-not-found",
            AuthErrorCode::WrongPassword => "auth/wrong-password",
            AuthErrorCode::InvalidCredential => "auth/invalid-credential",
            AuthErrorCode::EmailAlreadyInUse => "auth/email-already-in-use",
            AuthErrorCode::WeakPassword => "auth/weak-password",
            AuthErrorCode::InvalidEmail => "auth/invalid-email",
            AuthErrorCode::TooManyRequests => "auth/too-many-requests",
            AuthErrorCode::UserDisabled => "auth/user-disabled",
            AuthErrorCode::NetworkRequestFailed => "auth/network-request-failed",
            AuthErrorCode::Other(code) => code,
        }
    }

    /// Map an Identity Toolkit error message (e.g. `EMAIL_EXISTS`,
    /// `WEAK_PASSWORD : Password should be ...`) onto a code.
    pub fn from_identity_toolkit(message: &str) -> Self {
        let key = message.split([' ', ':']).next().unwrap_or(message);
        match key {
            "EMAIL_NOT_FOUND" => AuthErrorCode::UserNotFound,
            "INVALID_PASSWORD" => AuthErrorCode::WrongPassword,
            "INVALID_LOGIN_CREDENTIALS" => AuthErrorCode::InvalidCredential,
            "EMAIL_EXISTS" => AuthErrorCode::EmailAlreadyInUse,
            "WEAK_PASSWORD" => AuthErrorCode::WeakPassword,
            "INVALID_EMAIL" | "MISSING_EMAIL" => AuthErrorCode::InvalidEmail,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthErrorCode::TooManyRequests,
            "USER_DISABLED" => AuthErrorCode::UserDisabled,
            other => {
                AuthErrorCode::Other(format!("auth/{}", other.to_lowercase().replace('_', "-")))
            }
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Blob store error codes. Always carry the `storage/` prefix so they never
/// get confused with document permission errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageErrorCode {
    Unauthorized,
    Unauthenticated,
    ObjectNotFound,
    QuotaExceeded,
    InvalidFormat,
    Unknown,
}

impl StorageErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::Unauthorized => "storage/unauthorized",
            StorageErrorCode::Unauthenticated => "storage/unauthenticated",
            StorageErrorCode::ObjectNotFound => "storage/object-not-found",
            StorageErrorCode::QuotaExceeded => "storage/quota-exceeded",
            StorageErrorCode::InvalidFormat => "storage/invalid-format",
            StorageErrorCode::Unknown => "storage/unknown",
        }
    }

    pub fn from_status(status: u16) -> Self {
        match status {
            401 => StorageErrorCode::Unauthenticated,
            403 => StorageErrorCode::Unauthorized,
            404 => StorageErrorCode::ObjectNotFound,
            429 => StorageErrorCode::QuotaExceeded,
            _ => StorageErrorCode::Unknown,
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum BackendError {
    #[error("permission denied: {} on {}", .0.operation, .0.path)]
    PermissionDenied(PermissionContext),
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("auth error: {0}")]
    Auth(AuthErrorCode),
    #[error("{}: {message}", code.code())]
    Storage {
        code: StorageErrorCode,
        message: String,
    },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("database error: {0}")]
    Database(String),
}

impl BackendError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, BackendError::PermissionDenied(_))
    }

    pub fn permission_context(&self) -> Option<&PermissionContext> {
        match self {
            BackendError::PermissionDenied(ctx) => Some(ctx),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for BackendError {
    fn from(e: rusqlite::Error) -> Self {
        BackendError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(e: serde_json::Error) -> Self {
        BackendError::InvalidResponse(e.to_string())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        BackendError::Network(e.to_string())
    }
}
