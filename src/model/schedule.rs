// SPDX-License-Identifier: MPL-2.0

use crate::model::Record;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    Class,
    Event,
    Task,
}

impl ScheduleKind {
    /// Badge text; events carry no badge.
    pub fn badge(self) -> Option<&'static str> {
        match self {
            ScheduleKind::Class => Some("Clase"),
            ScheduleKind::Task => Some("Tarea"),
            ScheduleKind::Event => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    #[serde(skip)]
    pub id: String,
    pub course_name: String,
    #[serde(rename = "type")]
    pub kind: ScheduleKind,
    pub date: NaiveDate,
    #[serde(with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(with = "hh_mm")]
    pub end_time: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ScheduleItem {
    /// "08:00 - 10:00"
    pub fn time_range(&self) -> String {
        format!(
            "{} - {}",
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M")
        )
    }
}

impl Record for ScheduleItem {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Times are stored as `HH:MM`; seconds are accepted on read.
mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&t.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Document;
    use serde_json::json;

    #[test]
    fn wire_format_uses_type_and_short_times() {
        let doc = Document::new(
            "s1",
            json!({
                "courseName": "Cálculo III",
                "type": "class",
                "date": "2026-10-19",
                "startTime": "08:00",
                "endTime": "10:00:00",
                "location": "Aula 204"
            }),
        );
        let item = ScheduleItem::from_document(doc).unwrap();
        assert_eq!(item.kind, ScheduleKind::Class);
        assert_eq!(item.time_range(), "08:00 - 10:00");

        let data = item.to_data().unwrap();
        assert_eq!(data["endTime"], "10:00");
        assert_eq!(data["date"], "2026-10-19");
        assert_eq!(data["type"], "class");
    }
}
