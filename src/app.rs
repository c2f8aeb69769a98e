// SPDX-License-Identifier: MPL-2.0

use crate::backend::local::{LocalBackend, LocalDb};
use crate::backend::{AuthUser, Backend, BackendError};
use crate::model::Post;
use crate::notify::ToastSink;
use crate::services::{
    ActionError, AnnouncementService, AuthService, ImageUpload, PostService, ProfileService,
    ScheduleService, ServiceContext,
};
use crate::state::{AppSettings, BackendSettings, SessionManager, UserSession};
use crate::validation::{LoginForm, PostDraft, SignUpForm};
use std::sync::Arc;
use tracing::{info, warn};

/// Composition root: one backend, one toast sink, the services built on
/// them, and the signed-in user's session if there is one.
pub struct ConnectApp {
    backend: Backend,
    settings: AppSettings,
    session: Option<UserSession>,
    pub auth: AuthService,
    pub posts: PostService,
    pub announcements: AnnouncementService,
    pub schedule: ScheduleService,
    pub profiles: ProfileService,
}

impl ConnectApp {
    pub fn new(backend: Backend, toasts: Arc<dyn ToastSink>, settings: AppSettings) -> Self {
        let ctx = ServiceContext::new(backend.clone(), toasts);
        Self {
            backend,
            settings,
            session: None,
            auth: AuthService::new(ctx.clone()),
            posts: PostService::new(ctx.clone()),
            announcements: AnnouncementService::new(ctx.clone()),
            schedule: ScheduleService::new(ctx.clone()),
            profiles: ProfileService::new(ctx),
        }
    }

    /// Build the backend the settings select.
    pub fn from_settings(
        settings: AppSettings,
        toasts: Arc<dyn ToastSink>,
    ) -> Result<Self, BackendError> {
        let backend = match (&settings.backend, settings.firebase_config()) {
            (_, Some(config)) => {
                info!(project = %config.project_id, "using Firebase backend");
                Backend::firebase(config)
            }
            (BackendSettings::Local { path }, None) => {
                let path = match path {
                    Some(path) => path.clone(),
                    None => LocalDb::default_path()?,
                };
                info!(path = %path.display(), "using local backend");
                Backend::local(LocalBackend::open(&path)?)
            }
            (BackendSettings::Firebase { .. }, None) => {
                return Err(BackendError::InvalidResponse(
                    "firebase settings without configuration".to_string(),
                ));
            }
        };
        Ok(Self::new(backend, toasts, settings))
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut AppSettings {
        &mut self.settings
    }

    pub fn session(&self) -> Option<&UserSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut UserSession> {
        self.session.as_mut()
    }

    pub async fn login(&mut self, form: &LoginForm) -> Result<&UserSession, ActionError> {
        let user = self.auth.login(form).await?;
        Ok(self.start_session(user).await)
    }

    pub async fn signup(&mut self, form: &SignUpForm) -> Result<&UserSession, ActionError> {
        let (user, _) = self.auth.signup(form).await?;
        Ok(self.start_session(user).await)
    }

    /// Pick up the session saved in the keyring, if any. Returns whether a
    /// user is now signed in.
    pub async fn restore(&mut self) -> bool {
        if !self.settings.persist_session {
            return false;
        }
        let saved = match SessionManager::load().await {
            Ok(user) => user,
            Err(e) => {
                info!(reason = %e, "no session to restore");
                return false;
            }
        };
        match self.auth.restore(&saved).await {
            Ok(user) => {
                self.start_session(user).await;
                true
            }
            Err(e) => {
                warn!(error = %e, "saved session rejected");
                false
            }
        }
    }

    /// End the session: sign out, drop every per-user subscription and
    /// forget the saved credentials.
    pub async fn sign_out(&mut self) -> Result<(), ActionError> {
        let result = self.auth.sign_out().await;
        if let Some(mut session) = self.session.take() {
            session.teardown();
        }
        if self.settings.persist_session
            && let Err(e) = SessionManager::clear().await
        {
            warn!(error = %e, "failed to clear saved session");
        }
        result
    }

    /// Publish a post as the signed-in user and keep it in the session's
    /// buffer until the feed shows it.
    pub async fn compose(
        &mut self,
        draft: &PostDraft,
        image: Option<&ImageUpload>,
    ) -> Result<Post, ActionError> {
        let session = self.session.as_mut().ok_or(ActionError::NotSignedIn)?;
        let post = self.posts.create_post(session.uid(), draft, image).await?;
        session.buffer.push(post.clone());
        Ok(post)
    }

    async fn start_session(&mut self, user: AuthUser) -> &UserSession {
        if self.settings.persist_session
            && let Err(e) = SessionManager::store(&user).await
        {
            warn!(error = %e, "failed to save session");
        }
        if let Some(mut old) = self.session.take() {
            old.teardown();
        }
        info!(uid = %user.uid, "session started");
        self.session
            .insert(UserSession::new(user, self.backend.documents.clone()))
    }
}
