// SPDX-License-Identifier: MPL-2.0

//! Backend documents. Bodies are camelCase JSON; ids live in the path and are
//! filled in after decoding.

mod announcement;
mod post;
mod profile;
mod schedule;

pub use announcement::{Announcement, AnnouncementCategory};
pub use post::{Comment, Post};
pub use profile::{CAREERS, Role, RoleDetails, UserProfile, normalize_website};
pub use schedule::{ScheduleItem, ScheduleKind};

use crate::backend::{BackendError, Document};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A typed backend document.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);

    fn from_document(doc: Document) -> Result<Self, BackendError> {
        let mut record: Self = serde_json::from_value(doc.data)?;
        record.set_id(doc.id);
        Ok(record)
    }

    /// Body to store; the id is not part of it.
    fn to_data(&self) -> Result<Value, BackendError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Fixed-width RFC 3339 (`2024-08-15T10:00:00.000Z`), so string order is
/// time order in every backend.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_timestamp() -> String {
    format_timestamp(&Utc::now())
}

/// Serde adapter for `DateTime<Utc>` using [`format_timestamp`].
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(t))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            t: &Option<DateTime<Utc>>,
            s: S,
        ) -> Result<S::Ok, S::Error> {
            match t {
                Some(t) => s.serialize_str(&super::super::format_timestamp(t)),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            d: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let raw: Option<String> = Option::deserialize(d)?;
            raw.map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(serde::de::Error::custom)
            })
            .transpose()
        }
    }
}
