// SPDX-License-Identifier: MPL-2.0

use crate::backend::{Direction, Query, path};
use crate::live::LiveQuery;
use crate::model::{Record, ScheduleItem};
use crate::services::{ActionError, ServiceContext};
use crate::validation::ScheduleItemDraft;

const SAVE_FAILED: &str = "No se pudo guardar el horario";
const DELETE_FAILED: &str = "No se pudo eliminar del horario";

/// A user's own academic schedule.
pub struct ScheduleService {
    ctx: ServiceContext,
}

impl ScheduleService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Items ordered by date. Same-day ordering comes from
    /// [`crate::calendar::items_on`].
    pub fn feed(&self, uid: &str) -> LiveQuery<ScheduleItem> {
        let query =
            Query::new(path::academic_schedules(uid)).order_by("date", Direction::Ascending);
        LiveQuery::new(self.ctx.backend.documents.clone(), Some(query))
    }

    pub async fn add(
        &self,
        uid: &str,
        draft: ScheduleItemDraft,
    ) -> Result<ScheduleItem, ActionError> {
        draft.validate()?;
        let mut item = draft.into_item(String::new());
        item.id = self
            .ctx
            .backend
            .documents
            .add_document(&path::academic_schedules(uid), item.to_data()?)
            .await
            .map_err(|e| self.ctx.failed(SAVE_FAILED, e))?;
        Ok(item)
    }

    /// Replace an existing item.
    pub async fn update(
        &self,
        uid: &str,
        id: &str,
        draft: ScheduleItemDraft,
    ) -> Result<ScheduleItem, ActionError> {
        draft.validate()?;
        let item = draft.into_item(id.to_string());
        self.ctx
            .backend
            .documents
            .set_document(&path::schedule_item(uid, id), item.to_data()?)
            .await
            .map_err(|e| self.ctx.failed(SAVE_FAILED, e))?;
        Ok(item)
    }

    pub async fn delete(&self, uid: &str, id: &str) -> Result<(), ActionError> {
        self.ctx
            .backend
            .documents
            .delete_document(&path::schedule_item(uid, id))
            .await
            .map_err(|e| self.ctx.failed(DELETE_FAILED, e))
    }
}
