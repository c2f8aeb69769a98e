// SPDX-License-Identifier: MPL-2.0

use super::{FirebaseClient, api_error, invalid};
use crate::backend::{AuthErrorCode, AuthProvider, AuthUser, BackendError};
use crate::config::{IDENTITY_TOOLKIT_URL, SECURE_TOKEN_URL};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordAuthResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
    refresh_token: String,
}

/// The token endpoint answers in snake_case, unlike Identity Toolkit.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    user_id: String,
}

impl FirebaseClient {
    async fn identity_call<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: serde_json::Value,
    ) -> Result<T, BackendError> {
        let url = format!("{}/accounts:{}", IDENTITY_TOOLKIT_URL, endpoint);

        let response = self
            .http()
            .post(&url)
            .query(&[("key", self.config().api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|_| BackendError::Auth(AuthErrorCode::NetworkRequestFailed))?;

        if !response.status().is_success() {
            let (_, message, _) = api_error(response).await;
            debug!(endpoint, message = %message, "identity toolkit refused");
            return Err(BackendError::Auth(AuthErrorCode::from_identity_toolkit(
                &message,
            )));
        }

        response.json::<T>().await.map_err(invalid)
    }

    async fn password_auth(
        &self,
        endpoint: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, BackendError> {
        let out: PasswordAuthResponse = self
            .identity_call(
                endpoint,
                json!({ "email": email, "password": password, "returnSecureToken": true }),
            )
            .await?;

        let user = AuthUser {
            uid: out.local_id,
            email: out.email.unwrap_or_else(|| email.to_string()),
            id_token: Some(out.id_token),
            refresh_token: Some(out.refresh_token),
        };
        self.set_session(Some(user.clone()));
        Ok(user)
    }

    async fn refresh(&self, user: &AuthUser) -> Result<AuthUser, BackendError> {
        let refresh_token = user
            .refresh_token
            .as_deref()
            .ok_or(BackendError::NotAuthenticated)?;

        let response = self
            .http()
            .post(SECURE_TOKEN_URL)
            .query(&[("key", self.config().api_key.as_str())])
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(|_| BackendError::Auth(AuthErrorCode::NetworkRequestFailed))?;

        if !response.status().is_success() {
            let (_, message, _) = api_error(response).await;
            return Err(BackendError::Auth(AuthErrorCode::from_identity_toolkit(
                &message,
            )));
        }

        let out: RefreshResponse = response.json().await.map_err(invalid)?;
        Ok(AuthUser {
            uid: out.user_id,
            email: user.email.clone(),
            id_token: Some(out.id_token),
            refresh_token: Some(out.refresh_token),
        })
    }
}

#[async_trait]
impl AuthProvider for FirebaseClient {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, BackendError> {
        let user = self.password_auth("signUp", email, password).await?;
        info!(uid = %user.uid, "account created");
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, BackendError> {
        self.password_auth("signInWithPassword", email, password)
            .await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        // ID tokens are stateless; forgetting them is all there is to do
        self.set_session(None);
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), BackendError> {
        let _: serde_json::Value = self
            .identity_call(
                "sendOobCode",
                json!({ "requestType": "PASSWORD_RESET", "email": email }),
            )
            .await?;
        Ok(())
    }

    async fn resume(&self, user: &AuthUser) -> Result<AuthUser, BackendError> {
        let refreshed = self.refresh(user).await?;
        if refreshed.uid != user.uid {
            return Err(BackendError::Auth(AuthErrorCode::InvalidCredential));
        }
        self.set_session(Some(refreshed.clone()));
        Ok(refreshed)
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.session()
    }
}
