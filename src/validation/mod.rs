// SPDX-License-Identifier: MPL-2.0

//! Form schemas. Validation runs before any backend call; a failure carries
//! one message per offending field.

mod auth_forms;
mod content_forms;

pub use auth_forms::{ForgotPasswordForm, LoginForm, SignUpForm, SignUpRole};
pub use content_forms::{
    AnnouncementDraft, CommentDraft, PostDraft, ProfileSettingsForm, ScheduleItemDraft,
};

use email_address::EmailAddress;
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// Per-field messages, keyed by the form's wire field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message; the first message for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields: self })
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("validation failed for {} field(s)", fields.len())]
pub struct ValidationError {
    pub fields: FieldErrors,
}

impl ValidationError {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }
}

pub(crate) fn check_email(errors: &mut FieldErrors, field: &'static str, email: &str) {
    if !EmailAddress::is_valid(email.trim()) {
        errors.add(field, "Correo inválido");
    }
}

pub(crate) fn check_required(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &str,
    message: &str,
) {
    if value.trim().is_empty() {
        errors.add(field, message);
    }
}

pub(crate) fn is_valid_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|u| u.host_str().is_some())
}
