// SPDX-License-Identifier: MPL-2.0

use crate::backend::AuthUser;
use crate::config::APP_ID;
use secret_service::{Collection, EncryptionType, SecretService};
use thiserror::Error;

const SECRET_LABEL: &str = "UNSCH Connect Session";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("secret service unavailable: {0}")]
    SecretService(String),
    #[error("session not found")]
    NotFound,
    #[error("invalid session data: {0}")]
    InvalidData(String),
}

impl From<secret_service::Error> for SessionError {
    fn from(e: secret_service::Error) -> Self {
        SessionError::SecretService(e.to_string())
    }
}

/// Persists the signed-in account and its tokens in the desktop keyring.
pub struct SessionManager;

impl SessionManager {
    async fn connect() -> Result<SecretService<'static>, SessionError> {
        Ok(SecretService::connect(EncryptionType::Dh).await?)
    }

    async fn unlocked<'a>(ss: &'a SecretService<'a>) -> Result<Collection<'a>, SessionError> {
        let collection = ss.get_default_collection().await?;
        if collection.is_locked().await.unwrap_or(true) {
            collection.unlock().await?;
        }
        Ok(collection)
    }

    pub async fn store(user: &AuthUser) -> Result<(), SessionError> {
        let ss = Self::connect().await?;
        let collection = Self::unlocked(&ss).await?;

        let json =
            serde_json::to_string(user).map_err(|e| SessionError::InvalidData(e.to_string()))?;
        let attributes = vec![("application", APP_ID), ("uid", user.uid.as_str())];

        collection
            .create_item(
                SECRET_LABEL,
                attributes.into_iter().collect(),
                json.as_bytes(),
                true, // replace existing
                "text/plain",
            )
            .await?;

        Ok(())
    }

    pub async fn load() -> Result<AuthUser, SessionError> {
        let ss = Self::connect().await?;
        let collection = Self::unlocked(&ss).await?;

        let attributes = vec![("application", APP_ID)];
        let items = collection
            .search_items(attributes.into_iter().collect())
            .await?;
        let item = items.first().ok_or(SessionError::NotFound)?;
        let secret = item.get_secret().await?;

        serde_json::from_slice(&secret).map_err(|e| SessionError::InvalidData(e.to_string()))
    }

    pub async fn clear() -> Result<(), SessionError> {
        let ss = Self::connect().await?;
        let collection = Self::unlocked(&ss).await?;

        let attributes = vec![("application", APP_ID)];
        let items = collection
            .search_items(attributes.into_iter().collect())
            .await?;
        for item in items {
            item.delete().await?;
        }

        Ok(())
    }
}
