// SPDX-License-Identifier: MPL-2.0

use crate::backend::{Direction, Query, path};
use crate::live::LiveQuery;
use crate::messages;
use crate::model::{Announcement, Record, Role, UserProfile};
use crate::notify::Toast;
use crate::services::{ActionError, ServiceContext};
use crate::validation::AnnouncementDraft;
use chrono::Utc;
use tracing::info;

const PUBLISH_FAILED: &str = "No se pudo publicar el anuncio";
const DELETE_FAILED: &str = "No se pudo eliminar el anuncio";

pub struct AnnouncementService {
    ctx: ServiceContext,
}

impl AnnouncementService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Newest first.
    pub fn feed(&self) -> LiveQuery<Announcement> {
        let query =
            Query::new(path::announcements()).order_by("createdAt", Direction::Descending);
        LiveQuery::new(self.ctx.backend.documents.clone(), Some(query))
    }

    /// Officials and admins only. The backend enforces this too; the check
    /// here keeps students from getting as far as a permission error.
    pub async fn publish(
        &self,
        publisher: &UserProfile,
        draft: &AnnouncementDraft,
    ) -> Result<Announcement, ActionError> {
        if !publisher.role.role().can_publish_announcements() {
            return Err(self.ctx.refused(
                PUBLISH_FAILED,
                messages::PUBLISHERS_ONLY,
                ActionError::NotAllowed("publishing announcements"),
            ));
        }
        draft.validate()?;

        let mut announcement = Announcement {
            id: String::new(),
            title: draft.title.trim().to_string(),
            content: draft.content.trim().to_string(),
            category: draft.category,
            publisher_id: publisher.id.clone(),
            image_url: draft
                .image_url
                .as_deref()
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            created_at: Utc::now(),
        };
        announcement.id = self
            .ctx
            .backend
            .documents
            .add_document(&path::announcements(), announcement.to_data()?)
            .await
            .map_err(|e| self.ctx.failed(PUBLISH_FAILED, e))?;

        info!(id = %announcement.id, category = %announcement.category, "announcement published");
        self.ctx
            .toasts
            .show(Toast::success("Anuncio publicado", announcement.title.clone()));
        Ok(announcement)
    }

    pub fn can_delete(viewer: &UserProfile, announcement: &Announcement) -> bool {
        viewer.id == announcement.publisher_id || viewer.role.role() == Role::Admin
    }

    pub async fn delete(
        &self,
        viewer: &UserProfile,
        announcement: &Announcement,
    ) -> Result<(), ActionError> {
        if !Self::can_delete(viewer, announcement) {
            return Err(self
                .ctx
                .refused(DELETE_FAILED, messages::NOT_AUTHOR, ActionError::NotAuthor));
        }
        self.ctx
            .backend
            .documents
            .delete_document(&path::announcement(&announcement.id))
            .await
            .map_err(|e| self.ctx.failed(DELETE_FAILED, e))
    }
}
