// SPDX-License-Identifier: MPL-2.0

use crate::backend::path::{self, BlobKind};
use crate::backend::{BackendError, DocumentUpdate};
use crate::live::LiveDocument;
use crate::messages;
use crate::model::UserProfile;
use crate::notify::Toast;
use crate::optimistic::{Optimistic, ToggleState};
use crate::services::{ActionError, ImageUpload, ServiceContext, new_image_id};
use crate::validation::ProfileSettingsForm;
use tracing::{debug, info};

const SAVE_FAILED: &str = "No se pudo guardar tu perfil";
const UPLOAD_FAILED: &str = "No se pudo subir la imagen";
const FOLLOW_FAILED: &str = "No se pudo actualizar el seguimiento";

/// Which profile page to show for a requested id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileView {
    /// The viewer's own profile, with edit controls.
    Own,
    Other(String),
}

impl ProfileView {
    pub fn resolve(viewer: Option<&str>, id: &str) -> Self {
        match viewer {
            Some(viewer) if viewer == id => ProfileView::Own,
            _ => ProfileView::Other(id.to_string()),
        }
    }
}

/// Follow button on another user's profile. The count is that user's
/// follower count.
#[derive(Debug, Clone)]
pub struct FollowButton {
    viewer: String,
    target: String,
    state: Optimistic<ToggleState>,
}

impl FollowButton {
    pub fn new(viewer: &str, target: &UserProfile) -> Self {
        Self {
            viewer: viewer.to_string(),
            target: target.id.clone(),
            state: Optimistic::new(ToggleState::new(
                target.is_followed_by(viewer),
                target.followers.len() as u32,
            )),
        }
    }

    pub fn state(&self) -> ToggleState {
        *self.state.value()
    }

    /// Flip now; returns whether the user now wants to follow.
    pub fn press(&mut self) -> bool {
        let next = self.state.value().toggled();
        self.state.begin(next);
        next.active
    }

    pub fn settle(&mut self, ok: bool) {
        if ok {
            self.state.commit();
        } else {
            self.state.rollback();
        }
    }

    pub fn reconcile(&mut self, target: &UserProfile) {
        self.state.reconcile(ToggleState::new(
            target.is_followed_by(&self.viewer),
            target.followers.len() as u32,
        ));
    }
}

pub struct ProfileService {
    ctx: ServiceContext,
}

impl ProfileService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub fn profile(&self, uid: &str) -> LiveDocument<UserProfile> {
        LiveDocument::new(
            self.ctx.backend.documents.clone(),
            Some(path::user_profile(uid)),
        )
    }

    pub async fn update_settings(
        &self,
        uid: &str,
        form: &ProfileSettingsForm,
    ) -> Result<(), ActionError> {
        form.validate()?;

        let mut update = DocumentUpdate::new()
            .set("firstName", form.first_name.trim())
            .set("lastName", form.last_name.trim());
        let description = form.description.trim();
        update = if description.is_empty() {
            update.delete_field("description")
        } else {
            update.set("description", description)
        };
        update = match form.normalized_website() {
            Some(website) => update.set("website", website),
            None => update.delete_field("website"),
        };

        self.ctx
            .backend
            .documents
            .update_document(&path::user_profile(uid), update)
            .await
            .map_err(|e| self.ctx.failed(SAVE_FAILED, e))?;
        self.ctx.toasts.show(Toast::info("Perfil actualizado"));
        Ok(())
    }

    pub async fn upload_avatar(
        &self,
        uid: &str,
        image: &ImageUpload,
    ) -> Result<String, ActionError> {
        self.upload(uid, image, BlobKind::Avatar, "profilePicture").await
    }

    pub async fn upload_cover(
        &self,
        uid: &str,
        image: &ImageUpload,
    ) -> Result<String, ActionError> {
        self.upload(uid, image, BlobKind::Cover, "coverImage").await
    }

    async fn upload(
        &self,
        uid: &str,
        image: &ImageUpload,
        kind: BlobKind,
        field: &str,
    ) -> Result<String, ActionError> {
        let content_type = self.ctx.sniff(UPLOAD_FAILED, image)?;
        let blob = path::blob(kind, uid, &new_image_id());

        // Storage failures carry their own codes and never count as
        // document permission errors.
        let url = self
            .ctx
            .backend
            .blobs
            .upload_bytes(&blob, image.bytes.clone(), content_type)
            .await
            .map_err(|e| self.ctx.failed(UPLOAD_FAILED, e))?;

        self.ctx
            .backend
            .documents
            .update_document(
                &path::user_profile(uid),
                DocumentUpdate::new().set(field, url.as_str()),
            )
            .await
            .map_err(|e| self.ctx.failed(UPLOAD_FAILED, e))?;

        debug!(blob = %blob, "profile image replaced");
        Ok(url)
    }

    /// Press, send and settle a follow toggle.
    pub async fn toggle_follow(&self, button: &mut FollowButton) -> Result<(), ActionError> {
        let follow = button.press();
        let result = self
            .set_following(&button.viewer, &button.target, follow)
            .await;
        button.settle(result.is_ok());
        result
    }

    /// Two separate writes: the viewer's `following`, then the target's
    /// `followers`. A failure in between leaves them out of step.
    pub async fn set_following(
        &self,
        viewer: &str,
        target: &str,
        follow: bool,
    ) -> Result<(), ActionError> {
        if viewer == target {
            return Err(self.ctx.refused(
                FOLLOW_FAILED,
                messages::SELF_FOLLOW,
                ActionError::NotAllowed("self-follow"),
            ));
        }
        self.write_follow(viewer, target, follow)
            .await
            .map_err(|e| self.ctx.failed(FOLLOW_FAILED, e))?;
        info!(viewer = %viewer, target = %target, follow, "follow updated");
        Ok(())
    }

    async fn write_follow(
        &self,
        viewer: &str,
        target: &str,
        follow: bool,
    ) -> Result<(), BackendError> {
        let documents = &self.ctx.backend.documents;
        documents
            .update_document(
                &path::user_profile(viewer),
                DocumentUpdate::new().array_toggle("following", target, follow),
            )
            .await?;
        documents
            .update_document(
                &path::user_profile(target),
                DocumentUpdate::new().array_toggle("followers", viewer, follow),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn own_profile_redirects() {
        assert_eq!(ProfileView::resolve(Some("u1"), "u1"), ProfileView::Own);
        assert_eq!(
            ProfileView::resolve(Some("u1"), "u2"),
            ProfileView::Other("u2".into())
        );
        assert_eq!(
            ProfileView::resolve(None, "u1"),
            ProfileView::Other("u1".into())
        );
    }
}
