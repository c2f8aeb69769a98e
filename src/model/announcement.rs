// SPDX-License-Identifier: MPL-2.0

use crate::model::{Record, timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncementCategory {
    Rectorado,
    Facultad,
    Admision,
}

impl AnnouncementCategory {
    pub const ALL: [AnnouncementCategory; 3] = [
        AnnouncementCategory::Rectorado,
        AnnouncementCategory::Facultad,
        AnnouncementCategory::Admision,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AnnouncementCategory::Rectorado => "Rectorado",
            AnnouncementCategory::Facultad => "Facultad",
            AnnouncementCategory::Admision => "Admisión",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "rectorado" => Some(AnnouncementCategory::Rectorado),
            "facultad" => Some(AnnouncementCategory::Facultad),
            "admision" => Some(AnnouncementCategory::Admision),
            _ => None,
        }
    }
}

impl fmt::Display for AnnouncementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    #[serde(skip)]
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: AnnouncementCategory,
    pub publisher_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Record for Announcement {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
