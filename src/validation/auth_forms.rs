// SPDX-License-Identifier: MPL-2.0

use crate::config::{INSTITUTIONAL_EMAIL_DOMAIN, MIN_PASSWORD_LEN, STUDENT_CODE_LEN};
use crate::model::{CAREERS, RoleDetails, UserProfile};
use crate::validation::{FieldErrors, ValidationError, check_email, check_required};
use once_cell::sync::Lazy;
use regex::Regex;

static STUDENT_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{8}$").expect("student code pattern is valid"));

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, "email", &self.email);
        if self.password.is_empty() {
            errors.add("password", "La contraseña es requerida.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ForgotPasswordForm {
    pub email: String,
}

impl ForgotPasswordForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, "email", &self.email);
        errors.into_result()
    }
}

/// Role-dependent part of the signup form.
#[derive(Debug, Clone)]
pub enum SignUpRole {
    StudentTeacher { student_code: String, career: String },
    Official { department: String },
    Admin,
}

#[derive(Debug, Clone)]
pub struct SignUpForm {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub confirm_password: String,
    pub role: SignUpRole,
}

impl SignUpForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::new();

        check_email(&mut errors, "email", &self.email);
        if !self
            .email
            .trim()
            .to_lowercase()
            .ends_with(INSTITUTIONAL_EMAIL_DOMAIN)
        {
            errors.add("email", "Debe ser un correo institucional de la UNSCH.");
        }

        check_required(&mut errors, "firstName", &self.first_name, "El nombre es requerido.");
        check_required(&mut errors, "lastName", &self.last_name, "El apellido es requerido.");

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.add(
                "password",
                format!(
                    "La contraseña debe tener al menos {} caracteres.",
                    MIN_PASSWORD_LEN
                ),
            );
        }
        if self.password != self.confirm_password {
            errors.add("confirmPassword", "Las contraseñas no coinciden.");
        }

        match &self.role {
            SignUpRole::StudentTeacher {
                student_code,
                career,
            } => {
                if student_code.chars().count() != STUDENT_CODE_LEN {
                    errors.add(
                        "studentCode",
                        format!("El código debe tener {} dígitos.", STUDENT_CODE_LEN),
                    );
                } else if !STUDENT_CODE.is_match(student_code) {
                    errors.add("studentCode", "El código solo debe contener números.");
                }
                if career.trim().is_empty() || !CAREERS.contains(&career.as_str()) {
                    errors.add("career", "Debes seleccionar una carrera.");
                }
            }
            SignUpRole::Official { department } => {
                check_required(
                    &mut errors,
                    "department",
                    department,
                    "La dependencia es requerida.",
                );
            }
            SignUpRole::Admin => {}
        }

        errors.into_result()
    }

    /// Profile document created for the new account.
    pub fn to_profile(&self, uid: &str) -> UserProfile {
        let role = match &self.role {
            SignUpRole::StudentTeacher {
                student_code,
                career,
            } => RoleDetails::StudentTeacher {
                student_code: student_code.clone(),
                school: career.clone(),
                cycle: None,
            },
            SignUpRole::Official { department } => RoleDetails::Official {
                department: department.trim().to_string(),
            },
            SignUpRole::Admin => RoleDetails::Admin { department: None },
        };

        UserProfile {
            id: uid.to_string(),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            role,
            profile_picture: None,
            cover_image: None,
            description: None,
            website: None,
            followers: Vec::new(),
            following: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SignUpForm {
        SignUpForm {
            email: "ana.quispe@unsch.edu.pe".into(),
            first_name: "Ana".into(),
            last_name: "Quispe".into(),
            password: "secreto123".into(),
            confirm_password: "secreto123".into(),
            role: SignUpRole::StudentTeacher {
                student_code: "27201234".into(),
                career: "Ingeniería de Sistemas".into(),
            },
        }
    }

    #[test]
    fn valid_student_signup() {
        assert!(form().validate().is_ok());
    }

    #[test]
    fn non_institutional_domain_is_rejected() {
        let mut f = form();
        f.email = "ana@gmail.com".into();
        let err = f.validate().unwrap_err();
        assert_eq!(
            err.field("email"),
            Some("Debe ser un correo institucional de la UNSCH.")
        );
    }

    #[test]
    fn mismatch_is_reported_on_confirm_password() {
        let mut f = form();
        f.confirm_password = "secreto124".into();
        let err = f.validate().unwrap_err();
        assert_eq!(err.field("confirmPassword"), Some("Las contraseñas no coinciden."));
        assert!(err.field("password").is_none());
    }

    #[test]
    fn student_code_length_and_digits() {
        let mut f = form();
        f.role = SignUpRole::StudentTeacher {
            student_code: "1234".into(),
            career: "Derecho".into(),
        };
        assert_eq!(
            f.validate().unwrap_err().field("studentCode"),
            Some("El código debe tener 8 dígitos.")
        );

        f.role = SignUpRole::StudentTeacher {
            student_code: "1234abcd".into(),
            career: "Derecho".into(),
        };
        assert_eq!(
            f.validate().unwrap_err().field("studentCode"),
            Some("El código solo debe contener números.")
        );
    }

    #[test]
    fn role_variants_require_their_own_fields() {
        let mut f = form();
        f.role = SignUpRole::Official {
            department: "  ".into(),
        };
        let err = f.validate().unwrap_err();
        assert!(err.fields.has("department"));
        assert!(!err.fields.has("studentCode"));

        f.role = SignUpRole::Admin;
        assert!(f.validate().is_ok());
    }

    #[test]
    fn unknown_career_is_rejected() {
        let mut f = form();
        f.role = SignUpRole::StudentTeacher {
            student_code: "27201234".into(),
            career: "Astronáutica".into(),
        };
        assert!(f.validate().unwrap_err().fields.has("career"));
    }

    #[test]
    fn login_requires_password() {
        let err = LoginForm {
            email: "ana@unsch.edu.pe".into(),
            password: String::new(),
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.field("password"), Some("La contraseña es requerida."));
        assert!(
            ForgotPasswordForm {
                email: "x".into()
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn profile_from_official_form() {
        let mut f = form();
        f.role = SignUpRole::Official {
            department: "Oficina de Admisión".into(),
        };
        let profile = f.to_profile("uid-1");
        assert_eq!(profile.id, "uid-1");
        assert_eq!(profile.role.affiliation(), Some("Oficina de Admisión"));
    }
}
