// SPDX-License-Identifier: MPL-2.0

use crate::backend::{AuthUser, DocumentStore, path};
use crate::live::{LiveDocument, LiveState};
use crate::model::{Post, UserProfile};
use crate::services::posts::{AuthorLookup, Lookup, PostLookup};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

/// Posts composed in this session that the live feed has not delivered yet.
#[derive(Debug, Clone, Default)]
pub struct PostBuffer {
    posts: Vec<Post>,
}

impl PostBuffer {
    pub fn push(&mut self, post: Post) {
        self.posts.push(post);
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Forget buffered posts the feed now contains.
    pub fn prune(&mut self, live: &[Post]) {
        let seen: HashSet<&str> = live.iter().map(|p| p.id.as_str()).collect();
        self.posts.retain(|p| !seen.contains(p.id.as_str()));
    }

    /// Feed plus pending posts, newest first.
    pub fn merged(&self, live: &[Post]) -> Vec<Post> {
        let seen: HashSet<&str> = live.iter().map(|p| p.id.as_str()).collect();
        let mut all: Vec<Post> = live.to_vec();
        all.extend(
            self.posts
                .iter()
                .filter(|p| !seen.contains(p.id.as_str()))
                .cloned(),
        );
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    pub fn clear(&mut self) {
        self.posts.clear();
    }
}

/// Everything tied to the signed-in user. Dropping it stops the profile
/// subscription and every author lookup.
pub struct UserSession {
    user: AuthUser,
    profile: LiveDocument<UserProfile>,
    pub authors: AuthorLookup,
    pub originals: PostLookup,
    pub buffer: PostBuffer,
}

impl UserSession {
    pub fn new(user: AuthUser, store: Arc<dyn DocumentStore>) -> Self {
        let profile = LiveDocument::new(store.clone(), Some(path::user_profile(&user.uid)));
        Self {
            user,
            profile,
            authors: Lookup::authors(store.clone()),
            originals: Lookup::posts(store),
            buffer: PostBuffer::default(),
        }
    }

    pub fn user(&self) -> &AuthUser {
        &self.user
    }

    pub fn uid(&self) -> &str {
        &self.user.uid
    }

    /// Current profile, `None` while loading or if the document is missing.
    pub fn profile(&self) -> Option<UserProfile> {
        self.profile.current()
    }

    pub fn watch_profile(&self) -> watch::Receiver<LiveState<Option<UserProfile>>> {
        self.profile.watch()
    }

    pub async fn profile_loaded(&self) -> Option<UserProfile> {
        self.profile.loaded().await.data
    }

    pub fn can_publish_announcements(&self) -> bool {
        self.profile()
            .is_some_and(|p| p.role.role().can_publish_announcements())
    }

    /// Drop subscriptions and buffered state.
    pub fn teardown(&mut self) {
        self.profile.set_path(None);
        self.authors.clear();
        self.originals.clear();
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn post(id: &str, minutes_ago: i64) -> Post {
        let mut p = Post::new("u1", id, None);
        p.id = id.into();
        p.created_at = Utc::now() - Duration::minutes(minutes_ago);
        p
    }

    #[test]
    fn buffer_merges_until_the_feed_catches_up() {
        let mut buffer = PostBuffer::default();
        buffer.push(post("nuevo", 0));

        let live = vec![post("viejo", 10)];
        let merged = buffer.merged(&live);
        assert_eq!(merged[0].id, "nuevo");
        assert_eq!(merged.len(), 2);

        let live = vec![post("nuevo", 0), post("viejo", 10)];
        assert_eq!(buffer.merged(&live).len(), 2);
        buffer.prune(&live);
        assert!(buffer.is_empty());
    }
}
