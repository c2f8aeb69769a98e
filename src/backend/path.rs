// SPDX-License-Identifier: MPL-2.0

use crate::config::{collections, storage};
use std::fmt;

/// Slash-separated path with an odd number of segments, e.g. `posts` or
/// `posts/abc/comments`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

/// Slash-separated path with an even number of segments, e.g. `posts/abc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath(String);

impl CollectionPath {
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    pub fn doc(&self, id: &str) -> DocumentPath {
        DocumentPath(format!("{}/{}", self.0, id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment, the collection id.
    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Document owning this sub-collection, if any.
    pub fn parent(&self) -> Option<DocumentPath> {
        self.0
            .rsplit_once('/')
            .map(|(parent, _)| DocumentPath(parent.to_string()))
    }
}

impl DocumentPath {
    /// Parse a path, rejecting anything that does not name a document.
    pub fn parse(path: &str) -> Option<Self> {
        let trimmed = path.trim_matches('/');
        let segments: Vec<&str> = trimmed.split('/').collect();
        if segments.is_empty() || segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty())
        {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn collection(&self, name: &str) -> CollectionPath {
        CollectionPath(format!("{}/{}", self.0, name))
    }

    pub fn parent(&self) -> CollectionPath {
        let (parent, _) = self.0.rsplit_once('/').unwrap_or(("", &self.0));
        CollectionPath(parent.to_string())
    }

    pub fn id(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn user_profiles() -> CollectionPath {
    CollectionPath::root(collections::USER_PROFILES)
}

pub fn user_profile(uid: &str) -> DocumentPath {
    user_profiles().doc(uid)
}

pub fn posts() -> CollectionPath {
    CollectionPath::root(collections::POSTS)
}

pub fn post(id: &str) -> DocumentPath {
    posts().doc(id)
}

pub fn comments(post_id: &str) -> CollectionPath {
    post(post_id).collection(collections::COMMENTS)
}

pub fn announcements() -> CollectionPath {
    CollectionPath::root(collections::ANNOUNCEMENTS)
}

pub fn announcement(id: &str) -> DocumentPath {
    announcements().doc(id)
}

pub fn academic_schedules(uid: &str) -> CollectionPath {
    user_profile(uid).collection(collections::ACADEMIC_SCHEDULES)
}

pub fn schedule_item(uid: &str, id: &str) -> DocumentPath {
    academic_schedules(uid).doc(id)
}

/// Blob destinations. `image_id` is generated by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    Avatar,
    Cover,
    PostImage,
}

pub fn blob(kind: BlobKind, uid: &str, image_id: &str) -> String {
    let prefix = match kind {
        BlobKind::Avatar => storage::AVATARS,
        BlobKind::Cover => storage::COVERS,
        BlobKind::PostImage => storage::POST_IMAGES,
    };
    format!("{prefix}/{uid}/{image_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_have_the_expected_shape() {
        assert_eq!(user_profile("u1").as_str(), "userProfiles/u1");
        assert_eq!(comments("p1").doc("c1").as_str(), "posts/p1/comments/c1");
        assert_eq!(
            schedule_item("u1", "s1").as_str(),
            "userProfiles/u1/academicSchedules/s1"
        );
        assert_eq!(announcement("a1").as_str(), "announcements/a1");
        assert_eq!(blob(BlobKind::Cover, "u1", "img"), "covers/u1/img");
    }

    #[test]
    fn parent_and_id_navigation() {
        let path = comments("p1").doc("c1");
        assert_eq!(path.id(), "c1");
        assert_eq!(path.parent().as_str(), "posts/p1/comments");
        assert_eq!(path.parent().id(), "comments");
        assert_eq!(path.parent().parent(), Some(post("p1")));
        assert_eq!(posts().parent(), None);
    }

    #[test]
    fn parse_rejects_collection_paths() {
        assert!(DocumentPath::parse("posts").is_none());
        assert!(DocumentPath::parse("posts//x").is_none());
        assert_eq!(DocumentPath::parse("/posts/x/").unwrap().as_str(), "posts/x");
    }
}
