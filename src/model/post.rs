// SPDX-License-Identifier: MPL-2.0

use crate::model::{Record, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(skip)]
    pub id: String,
    pub author_id: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub liked_by: Vec<String>,
    #[serde(default)]
    pub reposted_by: Vec<String>,
    /// Set exactly when this post is a repost.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_post_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_author_id: Option<String>,
}

impl Post {
    pub fn new(author_id: &str, content: &str, image_url: Option<String>) -> Self {
        Self {
            id: String::new(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            image_url,
            created_at: Utc::now(),
            updated_at: None,
            liked_by: Vec::new(),
            reposted_by: Vec::new(),
            original_post_id: None,
            original_author_id: None,
        }
    }

    /// A fresh repost of `original` by `author_id`. Its own likes and
    /// reposts start empty.
    pub fn repost_of(original: &Post, author_id: &str) -> Self {
        Self {
            id: String::new(),
            author_id: author_id.to_string(),
            content: original.content.clone(),
            image_url: original.image_url.clone(),
            created_at: Utc::now(),
            updated_at: None,
            liked_by: Vec::new(),
            reposted_by: Vec::new(),
            original_post_id: Some(original.id.clone()),
            original_author_id: Some(original.author_id.clone()),
        }
    }

    pub fn is_repost(&self) -> bool {
        self.original_post_id.is_some()
    }

    pub fn is_liked_by(&self, uid: &str) -> bool {
        self.liked_by.iter().any(|u| u == uid)
    }

    pub fn is_reposted_by(&self, uid: &str) -> bool {
        self.reposted_by.iter().any(|u| u == uid)
    }

    pub fn like_count(&self) -> u32 {
        self.liked_by.len() as u32
    }

    pub fn repost_count(&self) -> u32 {
        self.reposted_by.len() as u32
    }
}

impl Record for Post {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(skip)]
    pub id: String,
    pub author_id: String,
    pub content: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(author_id: &str, content: &str) -> Self {
        Self {
            id: String::new(),
            author_id: author_id.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }
}

impl Record for Comment {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
