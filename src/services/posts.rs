// SPDX-License-Identifier: MPL-2.0

use crate::backend::path::{self, BlobKind};
use crate::backend::{BackendError, Direction, DocumentPath, DocumentStore, DocumentUpdate, Query};
use crate::live::{LiveDocument, LiveQuery};
use crate::messages;
use crate::model::{Comment, Post, Record, UserProfile};
use crate::optimistic::{Optimistic, ToggleState};
use crate::search::Searchable;
use crate::services::{ActionError, ImageUpload, ServiceContext, new_image_id};
use crate::timefmt;
use crate::validation::{CommentDraft, PostDraft};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

const PUBLISH_FAILED: &str = "No se pudo publicar";
const LIKE_FAILED: &str = "No se pudo registrar tu me gusta";
const REPOST_FAILED: &str = "No se pudo compartir";
const DELETE_FAILED: &str = "No se pudo eliminar";
const COMMENT_FAILED: &str = "No se pudo comentar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleKind {
    Like,
    Repost,
}

/// A button press whose backend write is still to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleIntent {
    pub kind: ToggleKind,
    pub post_id: String,
    /// Final state the user asked for.
    pub active: bool,
}

/// A post as rendered for one viewer, with optimistic like and repost
/// buttons.
#[derive(Debug, Clone)]
pub struct PostCard {
    pub post: Post,
    viewer: String,
    like: Optimistic<ToggleState>,
    repost: Optimistic<ToggleState>,
    author_name: Option<String>,
    author_username: Option<String>,
}

impl PostCard {
    pub fn new(post: Post, viewer: &str) -> Self {
        let like = ToggleState::new(post.is_liked_by(viewer), post.like_count());
        let repost = ToggleState::new(post.is_reposted_by(viewer), post.repost_count());
        Self {
            post,
            viewer: viewer.to_string(),
            like: Optimistic::new(like),
            repost: Optimistic::new(repost),
            author_name: None,
            author_username: None,
        }
    }

    pub fn with_author(mut self, author: Option<&UserProfile>) -> Self {
        self.set_author(author);
        self
    }

    pub fn set_author(&mut self, author: Option<&UserProfile>) {
        self.author_name = author.map(UserProfile::display_name);
        self.author_username = author.map(|a| a.username().to_string());
    }

    pub fn id(&self) -> &str {
        &self.post.id
    }

    pub fn author_name(&self) -> &str {
        self.author_name.as_deref().unwrap_or(messages::UNKNOWN_USER)
    }

    /// Only the author is offered the delete action.
    pub fn can_delete(&self) -> bool {
        self.post.author_id == self.viewer
    }

    /// Reposts of reposts are not allowed.
    pub fn can_repost(&self) -> bool {
        !self.post.is_repost()
    }

    pub fn like(&self) -> ToggleState {
        *self.like.value()
    }

    pub fn repost(&self) -> ToggleState {
        *self.repost.value()
    }

    pub fn time_label(&self) -> String {
        timefmt::relative(Some(&self.post.created_at))
    }

    fn slot(&mut self, kind: ToggleKind) -> &mut Optimistic<ToggleState> {
        match kind {
            ToggleKind::Like => &mut self.like,
            ToggleKind::Repost => &mut self.repost,
        }
    }

    /// Flip the button now and describe the write to send.
    pub fn press(&mut self, kind: ToggleKind) -> ToggleIntent {
        let slot = self.slot(kind);
        let next = slot.value().toggled();
        slot.begin(next);
        ToggleIntent {
            kind,
            post_id: self.post.id.clone(),
            active: next.active,
        }
    }

    /// Keep the optimistic value on success, restore it on failure.
    pub fn settle(&mut self, kind: ToggleKind, ok: bool) {
        let slot = self.slot(kind);
        if ok {
            slot.commit();
        } else {
            slot.rollback();
        }
    }

    /// Take a newer snapshot of the post from the live feed.
    pub fn reconcile(&mut self, post: Post) {
        let viewer = self.viewer.clone();
        self.like.reconcile(ToggleState::new(
            post.is_liked_by(&viewer),
            post.like_count(),
        ));
        self.repost.reconcile(ToggleState::new(
            post.is_reposted_by(&viewer),
            post.repost_count(),
        ));
        self.post = post;
    }
}

impl Searchable for PostCard {
    fn haystacks(&self) -> Vec<&str> {
        let mut fields = vec![self.post.content.as_str()];
        fields.extend(self.author_name.as_deref());
        fields.extend(self.author_username.as_deref());
        fields
    }
}

/// A user's posts split the way the profile tabs show them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserActivity {
    pub posts: Vec<Post>,
    pub reposts: Vec<Post>,
}

impl UserActivity {
    pub fn split(all: Vec<Post>) -> Self {
        let (mut reposts, mut posts): (Vec<_>, Vec<_>) =
            all.into_iter().partition(Post::is_repost);
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        reposts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Self { posts, reposts }
    }
}

/// Result of resolving a referenced document.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Loading,
    Found(T),
    Missing,
}

/// Keeps one live subscription per referenced document, e.g. the author of
/// each visible post.
pub struct Lookup<T: Record> {
    store: Arc<dyn DocumentStore>,
    path: fn(&str) -> DocumentPath,
    entries: HashMap<String, LiveDocument<T>>,
}

pub type AuthorLookup = Lookup<UserProfile>;
pub type PostLookup = Lookup<Post>;

impl Lookup<UserProfile> {
    pub fn authors(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, path::user_profile)
    }

    pub fn display_name(&self, id: &str) -> String {
        match self.get(id) {
            Resolved::Found(profile) => profile.display_name(),
            Resolved::Loading => String::new(),
            Resolved::Missing => messages::UNKNOWN_USER.to_string(),
        }
    }
}

impl Lookup<Post> {
    pub fn posts(store: Arc<dyn DocumentStore>) -> Self {
        Self::new(store, path::post)
    }
}

impl<T: Record> Lookup<T> {
    fn new(store: Arc<dyn DocumentStore>, path: fn(&str) -> DocumentPath) -> Self {
        Self {
            store,
            path,
            entries: HashMap::new(),
        }
    }

    /// Start listening to `id` unless already listening.
    pub fn watch(&mut self, id: &str) {
        if id.is_empty() || self.entries.contains_key(id) {
            return;
        }
        debug!(id = %id, "lookup subscribed");
        let live = LiveDocument::new(self.store.clone(), Some((self.path)(id)));
        self.entries.insert(id.to_string(), live);
    }

    /// Drop subscriptions for ids no longer on screen.
    pub fn retain<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        let keep: std::collections::HashSet<&str> = ids.into_iter().collect();
        self.entries.retain(|id, _| keep.contains(id.as_str()));
    }

    pub fn get(&self, id: &str) -> Resolved<T> {
        let Some(live) = self.entries.get(id) else {
            return Resolved::Missing;
        };
        let state = live.state();
        match state.data {
            Some(record) => Resolved::Found(record),
            None if state.is_loading => Resolved::Loading,
            None => Resolved::Missing,
        }
    }

    /// Wait until `id` has resolved one way or the other.
    pub async fn resolve(&mut self, id: &str) -> Resolved<T> {
        self.watch(id);
        match self.entries.get(id) {
            Some(live) => match live.loaded().await.data {
                Some(record) => Resolved::Found(record),
                None => Resolved::Missing,
            },
            None => Resolved::Missing,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

pub struct PostService {
    ctx: ServiceContext,
}

impl PostService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    fn documents(&self) -> &dyn DocumentStore {
        self.ctx.backend.documents.as_ref()
    }

    /// All posts, newest first.
    pub fn community_feed(&self) -> LiveQuery<Post> {
        let query = Query::new(path::posts()).order_by("createdAt", Direction::Descending);
        LiveQuery::new(self.ctx.backend.documents.clone(), Some(query))
    }

    /// Everything `uid` authored, posts and reposts alike. Split with
    /// [`UserActivity::split`].
    pub fn user_activity(&self, uid: &str) -> LiveQuery<Post> {
        let query = Query::new(path::posts()).where_eq("authorId", uid);
        LiveQuery::new(self.ctx.backend.documents.clone(), Some(query))
    }

    pub fn comments(&self, post_id: &str) -> LiveQuery<Comment> {
        let query =
            Query::new(path::comments(post_id)).order_by("createdAt", Direction::Ascending);
        LiveQuery::new(self.ctx.backend.documents.clone(), Some(query))
    }

    pub fn authors(&self) -> AuthorLookup {
        Lookup::authors(self.ctx.backend.documents.clone())
    }

    pub fn originals(&self) -> PostLookup {
        Lookup::posts(self.ctx.backend.documents.clone())
    }

    /// Upload the image, if any, then add the post.
    pub async fn create_post(
        &self,
        author_id: &str,
        draft: &PostDraft,
        image: Option<&ImageUpload>,
    ) -> Result<Post, ActionError> {
        draft.validate(image.is_some())?;

        let image_url = match image {
            Some(image) => {
                let content_type = self.ctx.sniff(PUBLISH_FAILED, image)?;
                let blob = path::blob(BlobKind::PostImage, author_id, &new_image_id());
                let url = self
                    .ctx
                    .backend
                    .blobs
                    .upload_bytes(&blob, image.bytes.clone(), content_type)
                    .await
                    .map_err(|e| self.ctx.failed(PUBLISH_FAILED, e))?;
                Some(url)
            }
            None => None,
        };

        let mut post = Post::new(author_id, draft.content.trim(), image_url);
        let id = self
            .documents()
            .add_document(&path::posts(), post.to_data()?)
            .await
            .map_err(|e| self.ctx.failed(PUBLISH_FAILED, e))?;
        post.id = id;
        debug!(id = %post.id, "post created");
        Ok(post)
    }

    /// Press, send and settle a like.
    pub async fn toggle_like(&self, card: &mut PostCard) -> Result<(), ActionError> {
        let intent = card.press(ToggleKind::Like);
        let result = self.send(&card.viewer, &card.post, &intent).await;
        card.settle(ToggleKind::Like, result.is_ok());
        result
    }

    pub async fn toggle_repost(&self, card: &mut PostCard) -> Result<(), ActionError> {
        if !card.can_repost() {
            return Err(self.ctx.refused(
                REPOST_FAILED,
                messages::REPOST_OF_REPOST,
                ActionError::CannotRepostRepost,
            ));
        }
        let intent = card.press(ToggleKind::Repost);
        let result = self.send(&card.viewer, &card.post, &intent).await;
        card.settle(ToggleKind::Repost, result.is_ok());
        result
    }

    /// Send the write for an intent produced by [`PostCard::press`].
    pub async fn send(
        &self,
        viewer: &str,
        post: &Post,
        intent: &ToggleIntent,
    ) -> Result<(), ActionError> {
        match intent.kind {
            ToggleKind::Like => {
                let update = DocumentUpdate::new().array_toggle("likedBy", viewer, intent.active);
                self.documents()
                    .update_document(&path::post(&intent.post_id), update)
                    .await
                    .map_err(|e| self.ctx.failed(LIKE_FAILED, e))
            }
            ToggleKind::Repost if post.is_repost() => Err(ActionError::CannotRepostRepost),
            ToggleKind::Repost if intent.active => self
                .repost(viewer, post)
                .await
                .map_err(|e| self.ctx.failed(REPOST_FAILED, e)),
            ToggleKind::Repost => self
                .unrepost(viewer, post)
                .await
                .map_err(|e| self.ctx.failed(REPOST_FAILED, e)),
        }
    }

    async fn repost(&self, viewer: &str, original: &Post) -> Result<(), BackendError> {
        let repost = Post::repost_of(original, viewer);
        let id = self
            .documents()
            .add_document(&path::posts(), repost.to_data()?)
            .await?;
        let marked = self
            .documents()
            .update_document(
                &path::post(&original.id),
                DocumentUpdate::new().array_union("repostedBy", viewer),
            )
            .await;

        // The repost must not outlive a failed mark on the original
        if marked.is_err()
            && let Err(e) = self.documents().delete_document(&path::post(&id)).await
        {
            warn!(repost = %id, error = %e, "could not remove orphaned repost");
        }
        marked
    }

    async fn unrepost(&self, viewer: &str, original: &Post) -> Result<(), BackendError> {
        let mine = Query::new(path::posts())
            .where_eq("authorId", viewer)
            .where_eq("originalPostId", original.id.as_str());
        for doc in self.documents().query(&mine).await? {
            self.documents().delete_document(&path::post(&doc.id)).await?;
        }
        self.documents()
            .update_document(
                &path::post(&original.id),
                DocumentUpdate::new().array_remove("repostedBy", viewer),
            )
            .await
    }

    /// Authors only. Deleting a repost also takes the viewer off the
    /// original's repost list.
    pub async fn delete_post(&self, viewer: &str, post: &Post) -> Result<(), ActionError> {
        if post.author_id != viewer {
            return Err(self
                .ctx
                .refused(DELETE_FAILED, messages::NOT_AUTHOR, ActionError::NotAuthor));
        }
        self.documents()
            .delete_document(&path::post(&post.id))
            .await
            .map_err(|e| self.ctx.failed(DELETE_FAILED, e))?;

        if let Some(original_id) = &post.original_post_id {
            let update = DocumentUpdate::new().array_remove("repostedBy", viewer);
            match self
                .documents()
                .update_document(&path::post(original_id), update)
                .await
            {
                Ok(()) | Err(BackendError::NotFound(_)) => {}
                Err(e) => {
                    warn!(original = %original_id, error = %e, "could not update original post")
                }
            }
        }
        Ok(())
    }

    pub async fn add_comment(
        &self,
        viewer: &str,
        post_id: &str,
        draft: &CommentDraft,
    ) -> Result<Comment, ActionError> {
        draft.validate()?;
        let mut comment = Comment::new(viewer, draft.content.trim());
        comment.id = self
            .documents()
            .add_document(&path::comments(post_id), comment.to_data()?)
            .await
            .map_err(|e| self.ctx.failed(COMMENT_FAILED, e))?;
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn post(id: &str, author: &str) -> Post {
        let mut p = Post::new(author, "Hola", None);
        p.id = id.into();
        p
    }

    #[test]
    fn press_is_immediate_and_settle_rolls_back() {
        let mut card = PostCard::new(post("p1", "u1"), "u2");
        let intent = card.press(ToggleKind::Like);
        assert!(intent.active);
        assert_eq!(card.like(), ToggleState::new(true, 1));

        // a stale snapshot must not undo the pending like
        card.reconcile(post("p1", "u1"));
        assert_eq!(card.like().count, 1);

        card.settle(ToggleKind::Like, false);
        assert_eq!(card.like(), ToggleState::new(false, 0));
    }

    #[test]
    fn only_authors_may_delete() {
        assert!(PostCard::new(post("p1", "u1"), "u1").can_delete());
        assert!(!PostCard::new(post("p1", "u1"), "u2").can_delete());
    }

    #[test]
    fn activity_splits_and_sorts_newest_first() {
        let mut old = post("a", "u1");
        old.created_at = Utc::now() - Duration::hours(2);
        let new = post("b", "u1");
        let repost = Post::repost_of(&post("x", "u9"), "u1");

        let activity = UserActivity::split(vec![old, repost, new]);
        let ids: Vec<_> = activity.posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(activity.reposts.len(), 1);
    }

    #[test]
    fn unknown_author_uses_placeholder() {
        let card = PostCard::new(post("p1", "u1"), "u2").with_author(None);
        assert_eq!(card.author_name(), messages::UNKNOWN_USER);
    }
}
