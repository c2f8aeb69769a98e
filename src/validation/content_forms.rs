// SPDX-License-Identifier: MPL-2.0

use crate::model::{AnnouncementCategory, ScheduleItem, ScheduleKind, normalize_website};
use crate::validation::{FieldErrors, ValidationError, check_required, is_valid_url};
use chrono::{NaiveDate, NaiveTime};

#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub content: String,
}

impl PostDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// A post needs text or an image.
    pub fn validate(&self, has_image: bool) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        if self.content.trim().is_empty() && !has_image {
            errors.add("content", "Escribe algo o agrega una imagen.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommentDraft {
    pub content: String,
}

impl CommentDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        check_required(&mut errors, "content", &self.content, "El comentario está vacío.");
        errors.into_result()
    }
}

#[derive(Debug, Clone)]
pub struct AnnouncementDraft {
    pub title: String,
    pub content: String,
    pub category: AnnouncementCategory,
    pub image_url: Option<String>,
}

impl AnnouncementDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        check_required(&mut errors, "title", &self.title, "El título es requerido.");
        check_required(&mut errors, "content", &self.content, "El contenido es requerido.");
        if let Some(url) = self.image_url.as_deref().filter(|u| !u.trim().is_empty())
            && !is_valid_url(url.trim())
        {
            errors.add("imageUrl", "URL de imagen inválida.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleItemDraft {
    pub course_name: String,
    pub kind: ScheduleKind,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: Option<String>,
}

impl ScheduleItemDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        check_required(
            &mut errors,
            "courseName",
            &self.course_name,
            "El nombre del curso es requerido.",
        );
        if self.end_time <= self.start_time {
            errors.add(
                "endTime",
                "La hora de fin debe ser posterior a la hora de inicio.",
            );
        }
        errors.into_result()
    }

    pub fn from_item(item: &ScheduleItem) -> Self {
        Self {
            course_name: item.course_name.clone(),
            kind: item.kind,
            date: item.date,
            start_time: item.start_time,
            end_time: item.end_time,
            location: item.location.clone(),
        }
    }

    pub fn into_item(self, id: String) -> ScheduleItem {
        ScheduleItem {
            id,
            course_name: self.course_name.trim().to_string(),
            kind: self.kind,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileSettingsForm {
    pub first_name: String,
    pub last_name: String,
    pub description: String,
    pub website: String,
}

impl ProfileSettingsForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        check_required(&mut errors, "firstName", &self.first_name, "El nombre es requerido.");
        check_required(&mut errors, "lastName", &self.last_name, "El apellido es requerido.");
        if !self.website.trim().is_empty() && !is_valid_url(&normalize_website(&self.website)) {
            errors.add("website", "Ingresa una URL válida.");
        }
        errors.into_result()
    }

    /// Website as stored, or `None` when left blank.
    pub fn normalized_website(&self) -> Option<String> {
        let website = self.website.trim();
        (!website.is_empty()).then(|| normalize_website(website))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn post_needs_text_or_image() {
        assert!(PostDraft::new("   ").validate(false).is_err());
        assert!(PostDraft::new("   ").validate(true).is_ok());
        assert!(PostDraft::new("Hola UNSCH").validate(false).is_ok());
    }

    #[test]
    fn schedule_end_must_follow_start() {
        let mut draft = ScheduleItemDraft {
            course_name: "Física I".into(),
            kind: ScheduleKind::Class,
            date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
            start_time: time(10, 0),
            end_time: time(10, 0),
            location: Some("  ".into()),
        };
        assert!(draft.validate().unwrap_err().fields.has("endTime"));

        draft.end_time = time(12, 0);
        assert!(draft.validate().is_ok());
        let item = draft.into_item("s1".into());
        assert_eq!(item.location, None);
        assert_eq!(item.time_range(), "10:00 - 12:00");
    }

    #[test]
    fn website_is_normalized_before_checking() {
        let mut form = ProfileSettingsForm {
            first_name: "Ana".into(),
            last_name: "Quispe".into(),
            description: String::new(),
            website: "unsch.edu.pe".into(),
        };
        assert!(form.validate().is_ok());
        assert_eq!(
            form.normalized_website().as_deref(),
            Some("https://unsch.edu.pe")
        );

        form.website = "http://".into();
        assert!(form.validate().unwrap_err().fields.has("website"));

        form.website = " ".into();
        assert!(form.validate().is_ok());
        assert_eq!(form.normalized_website(), None);
    }

    #[test]
    fn announcement_requires_title_and_content() {
        let err = AnnouncementDraft {
            title: "".into(),
            content: " ".into(),
            category: AnnouncementCategory::Admision,
            image_url: None,
        }
        .validate()
        .unwrap_err();
        assert!(err.fields.has("title"));
        assert!(err.fields.has("content"));
    }
}
