// SPDX-License-Identifier: MPL-2.0

use crate::backend::{AuthUser, BackendError, path};
use crate::messages;
use crate::model::{Record, UserProfile};
use crate::notify::Toast;
use crate::services::{ActionError, ServiceContext};
use crate::validation::{ForgotPasswordForm, LoginForm, SignUpForm};
use tracing::info;

pub struct AuthService {
    ctx: ServiceContext,
}

impl AuthService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<AuthUser, ActionError> {
        form.validate()?;
        let user = self
            .ctx
            .backend
            .auth
            .sign_in(form.email.trim(), &form.password)
            .await
            .map_err(|e| self.auth_failed(messages::LOGIN_FAILED, e))?;
        info!(uid = %user.uid, "signed in");
        Ok(user)
    }

    /// Create the account, then its profile document.
    pub async fn signup(
        &self,
        form: &SignUpForm,
    ) -> Result<(AuthUser, UserProfile), ActionError> {
        form.validate()?;
        let user = self
            .ctx
            .backend
            .auth
            .sign_up(form.email.trim(), &form.password)
            .await
            .map_err(|e| self.auth_failed(messages::SIGNUP_FAILED, e))?;

        let profile = form.to_profile(&user.uid);
        let data = profile.to_data()?;
        self.ctx
            .backend
            .documents
            .set_document(&path::user_profile(&user.uid), data)
            .await
            .map_err(|e| self.ctx.failed(messages::SIGNUP_FAILED, e))?;

        info!(uid = %user.uid, role = ?profile.role.role(), "account created");
        Ok((user, profile))
    }

    pub async fn forgot_password(&self, form: &ForgotPasswordForm) -> Result<(), ActionError> {
        form.validate()?;
        let email = form.email.trim();
        self.ctx
            .backend
            .auth
            .send_password_reset(email)
            .await
            .map_err(|e| self.auth_failed(messages::AUTH_UNAVAILABLE, e))?;

        self.ctx.toasts.show(Toast::success(
            messages::RESET_SENT_TITLE,
            messages::reset_sent(email),
        ));
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), ActionError> {
        self.ctx
            .backend
            .auth
            .sign_out()
            .await
            .map_err(|e| self.ctx.failed(messages::AUTH_UNAVAILABLE, e))?;
        info!("signed out");
        Ok(())
    }

    /// Resume a persisted session. Failures are quiet: the user simply lands
    /// on the login screen.
    pub async fn restore(&self, user: &AuthUser) -> Result<AuthUser, ActionError> {
        let user = self.ctx.backend.auth.resume(user).await?;
        info!(uid = %user.uid, "session restored");
        Ok(user)
    }

    /// Auth errors get their own localized description; nothing else about
    /// them is reported.
    fn auth_failed(&self, title: &str, error: BackendError) -> ActionError {
        match &error {
            BackendError::Auth(code) => {
                tracing::debug!(code = %code, "auth request rejected");
                self.ctx
                    .toasts
                    .show(Toast::error(title, messages::auth_error(code)));
                ActionError::Backend(error)
            }
            _ => self.ctx.failed(title, error),
        }
    }
}
