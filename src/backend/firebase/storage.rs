// SPDX-License-Identifier: MPL-2.0

use super::{FirebaseClient, api_error, invalid};
use crate::backend::{BackendError, BlobStore, StorageErrorCode};
use crate::config::STORAGE_URL;
use async_trait::async_trait;
use serde::Deserialize;
use url::form_urlencoded::byte_serialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    #[serde(default)]
    download_tokens: Option<String>,
}

impl FirebaseClient {
    fn bucket_url(&self) -> String {
        format!("{}/b/{}/o", STORAGE_URL, self.config().storage_bucket)
    }

    /// Object names are a single path segment, slashes included.
    fn encode_object(path: &str) -> String {
        byte_serialize(path.as_bytes()).collect()
    }

    fn public_url(&self, path: &str, token: &str) -> String {
        format!(
            "{}/{}?alt=media&token={}",
            self.bucket_url(),
            Self::encode_object(path),
            token
        )
    }

    fn authorize_storage(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.id_token() {
            Some(token) => request.header("Authorization", format!("Firebase {}", token)),
            None => request,
        }
    }

    async fn storage_error(response: reqwest::Response) -> BackendError {
        let (status, message, _) = api_error(response).await;
        BackendError::Storage {
            code: StorageErrorCode::from_status(status),
            message,
        }
    }

    fn first_token(metadata: ObjectMetadata, path: &str) -> Result<String, BackendError> {
        metadata
            .download_tokens
            .as_deref()
            .and_then(|tokens| tokens.split(',').next())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or_else(|| BackendError::Storage {
                code: StorageErrorCode::Unknown,
                message: format!("no download token for {}", path),
            })
    }
}

#[async_trait]
impl BlobStore for FirebaseClient {
    async fn upload_bytes(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let response = self
            .authorize_storage(self.http().post(self.bucket_url()))
            .query(&[("uploadType", "media"), ("name", path)])
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::storage_error(response).await);
        }

        let metadata: ObjectMetadata = response.json().await.map_err(invalid)?;
        let token = Self::first_token(metadata, path)?;
        Ok(self.public_url(path, &token))
    }

    async fn download_url(&self, path: &str) -> Result<String, BackendError> {
        let url = format!("{}/{}", self.bucket_url(), Self::encode_object(path));
        let response = self
            .authorize_storage(self.http().get(url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::storage_error(response).await);
        }

        let metadata: ObjectMetadata = response.json().await.map_err(invalid)?;
        let token = Self::first_token(metadata, path)?;
        Ok(self.public_url(path, &token))
    }
}
