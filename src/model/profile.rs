// SPDX-License-Identifier: MPL-2.0

use crate::config::DEFAULT_AVATAR_URL;
use crate::config::DEFAULT_COVER_URL;
use crate::model::Record;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Careers offered by the university, as shown in the signup form.
pub const CAREERS: &[&str] = &[
    "Administración de Empresas",
    "Agronomía",
    "Ciencias Físico - Matemáticas: Matemática",
    "Ciencias Físico - Matemáticas: Física",
    "Ciencias Físico - Matemáticas: Estadística",
    "Contabilidad y Auditoría",
    "Economía",
    "Ingeniería Agrícola",
    "Ingeniería Agroforestal",
    "Ingeniería Agroindustrial",
    "Ingeniería Civil",
    "Ingeniería de Minas",
    "Ingeniería de Sistemas",
    "Ingeniería en Industrias Alimentarias",
    "Ingeniería Química",
    "Arquitectura",
    "Ingeniería Ambiental",
    "Antropología Social",
    "Arqueología e Historia: Arqueología",
    "Arqueología e Historia: Historia",
    "Ciencias de la Comunicación",
    "Derecho",
    "Educación Física",
    "Educación Inicial",
    "Educación Primaria",
    "Educación Secundaria: Lengua Española y Literatura",
    "Educación Secundaria: Matemática, Física e Informática",
    "Educación Secundaria: Ciencias Sociales y Filosofía",
    "Educación Secundaria: Inglés y Lengua Española",
    "Trabajo Social",
    "Biología: Microbiología",
    "Biología: Biotecnología",
    "Biología: Ecología y Recursos Naturales",
    "Enfermería",
    "Farmacia y Bioquímica",
    "Medicina Humana",
    "Medicina Veterinaria",
    "Obstetricia",
    "Psicología",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    StudentTeacher,
    Official,
    Admin,
}

impl Role {
    pub fn can_publish_announcements(self) -> bool {
        matches!(self, Role::Official | Role::Admin)
    }
}

/// Role tag plus the fields that only make sense for that role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleDetails {
    #[serde(rename_all = "camelCase")]
    StudentTeacher {
        student_code: String,
        /// Career, kept under the historical field name.
        school: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cycle: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Official { department: String },
    #[serde(rename_all = "camelCase")]
    Admin {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        department: Option<String>,
    },
}

impl RoleDetails {
    pub fn role(&self) -> Role {
        match self {
            RoleDetails::StudentTeacher { .. } => Role::StudentTeacher,
            RoleDetails::Official { .. } => Role::Official,
            RoleDetails::Admin { .. } => Role::Admin,
        }
    }

    /// School for students, department for staff.
    pub fn affiliation(&self) -> Option<&str> {
        match self {
            RoleDetails::StudentTeacher { school, .. } => Some(school),
            RoleDetails::Official { department } => Some(department),
            RoleDetails::Admin { department } => department.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(skip)]
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(flatten)]
    pub role: RoleDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default)]
    pub followers: Vec<String>,
    #[serde(default)]
    pub following: Vec<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            "Usuario".to_string()
        } else {
            name.to_string()
        }
    }

    /// Local part of the email, shown as the handle.
    pub fn username(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }

    /// First grapheme of each name, for avatar fallbacks.
    pub fn initials(&self) -> String {
        [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|n| n.trim().graphemes(true).next())
            .collect::<String>()
            .to_uppercase()
    }

    pub fn avatar_url(&self) -> &str {
        self.profile_picture.as_deref().unwrap_or(DEFAULT_AVATAR_URL)
    }

    pub fn cover_url(&self) -> &str {
        self.cover_image.as_deref().unwrap_or(DEFAULT_COVER_URL)
    }

    pub fn is_followed_by(&self, uid: &str) -> bool {
        self.followers.iter().any(|f| f == uid)
    }

    /// Website as a link target: scheme added when the user left it out.
    pub fn website_link(&self) -> Option<String> {
        self.website.as_deref().map(normalize_website)
    }

    /// Website as displayed: scheme stripped.
    pub fn website_label(&self) -> Option<&str> {
        self.website.as_deref().map(|w| {
            w.strip_prefix("https://")
                .or_else(|| w.strip_prefix("http://"))
                .unwrap_or(w)
        })
    }
}

pub fn normalize_website(website: &str) -> String {
    let website = website.trim();
    if website.starts_with("http") {
        website.to_string()
    } else {
        format!("https://{}", website)
    }
}

impl Record for UserProfile {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Document;
    use serde_json::json;

    fn student() -> UserProfile {
        UserProfile {
            id: "u1".into(),
            email: "ana.quispe@unsch.edu.pe".into(),
            first_name: "Ána".into(),
            last_name: "Quispe".into(),
            role: RoleDetails::StudentTeacher {
                student_code: "27201234".into(),
                school: "Ingeniería de Sistemas".into(),
                cycle: None,
            },
            profile_picture: None,
            cover_image: None,
            description: None,
            website: Some("unsch.edu.pe".into()),
            followers: vec!["u2".into()],
            following: vec![],
        }
    }

    #[test]
    fn role_fields_are_flattened_on_the_wire() {
        let data = student().to_data().unwrap();
        assert_eq!(data["role"], "student_teacher");
        assert_eq!(data["studentCode"], "27201234");
        assert_eq!(data["school"], "Ingeniería de Sistemas");
        assert_eq!(data["firstName"], "Ána");
        assert!(data.get("id").is_none());
        assert!(data.get("cycle").is_none());
    }

    #[test]
    fn decodes_an_official_profile() {
        let doc = Document::new(
            "o1",
            json!({
                "email": "rectorado@unsch.edu.pe",
                "firstName": "Rectorado",
                "lastName": "",
                "role": "official",
                "department": "Rectorado"
            }),
        );
        let profile = UserProfile::from_document(doc).unwrap();

        assert_eq!(profile.id, "o1");
        assert_eq!(profile.role.role(), Role::Official);
        assert!(profile.role.role().can_publish_announcements());
        assert_eq!(profile.display_name(), "Rectorado");
        assert!(profile.followers.is_empty());
    }

    #[test]
    fn derived_display_fields() {
        let p = student();
        assert_eq!(p.username(), "ana.quispe");
        assert_eq!(p.initials(), "ÁQ");
        assert_eq!(p.avatar_url(), DEFAULT_AVATAR_URL);
        assert_eq!(p.website_link().as_deref(), Some("https://unsch.edu.pe"));
        assert_eq!(p.website_label(), Some("unsch.edu.pe"));
        assert!(p.is_followed_by("u2"));
    }
}
