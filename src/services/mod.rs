// SPDX-License-Identifier: MPL-2.0

//! Use cases behind each screen. Services validate input, talk to the
//! backend capabilities, and turn failures into toasts and diagnostics.

pub mod announcements;
pub mod auth;
pub mod posts;
pub mod profile;
pub mod schedule;

pub use announcements::AnnouncementService;
pub use auth::AuthService;
pub use posts::{
    AuthorLookup, Lookup, PostCard, PostLookup, PostService, Resolved, ToggleIntent, ToggleKind,
    UserActivity,
};
pub use profile::{FollowButton, ProfileService, ProfileView};
pub use schedule::ScheduleService;

use crate::backend::{Backend, BackendError, StorageErrorCode};
use crate::diagnostics;
use crate::messages;
use crate::notify::{Toast, ToastSink};
use crate::validation::ValidationError;
use image::ImageFormat;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("not signed in")]
    NotSignedIn,
    #[error("cannot repost a repost")]
    CannotRepostRepost,
    #[error("only the author can do this")]
    NotAuthor,
    #[error("{0} is not allowed")]
    NotAllowed(&'static str),
    #[error("unsupported image format")]
    UnsupportedImage,
}

impl ActionError {
    pub fn backend(&self) -> Option<&BackendError> {
        match self {
            ActionError::Backend(e) => Some(e),
            _ => None,
        }
    }
}

/// What every service needs: the backend and somewhere to send toasts.
#[derive(Clone)]
pub struct ServiceContext {
    pub backend: Backend,
    pub toasts: Arc<dyn ToastSink>,
}

impl ServiceContext {
    pub fn new(backend: Backend, toasts: Arc<dyn ToastSink>) -> Self {
        Self { backend, toasts }
    }

    /// Report a failed backend call, tell the user, and hand the error back.
    pub(crate) fn failed(&self, title: &str, error: BackendError) -> ActionError {
        diagnostics::report(&error);
        self.toasts.show(Toast::from_backend(title, &error));
        ActionError::Backend(error)
    }

    /// Tell the user an action was refused before reaching the backend.
    pub(crate) fn refused(
        &self,
        title: &str,
        description: &str,
        error: ActionError,
    ) -> ActionError {
        self.toasts.show(Toast::error(title, description));
        error
    }

    /// Content type of an image the user picked; unsupported formats are
    /// refused before any upload.
    pub(crate) fn sniff(
        &self,
        title: &str,
        image: &ImageUpload,
    ) -> Result<&'static str, ActionError> {
        image.content_type().inspect_err(|_| {
            self.toasts.show(Toast::error(
                title,
                messages::storage_error(&StorageErrorCode::InvalidFormat),
            ));
        })
    }
}

/// Image bytes picked by the user. The content type is sniffed, never
/// trusted from the file name.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// MIME type if the bytes are a PNG or JPEG image.
    pub fn content_type(&self) -> Result<&'static str, ActionError> {
        match image::guess_format(&self.bytes) {
            Ok(format @ (ImageFormat::Png | ImageFormat::Jpeg)) => Ok(format.to_mime_type()),
            _ => Err(ActionError::UnsupportedImage),
        }
    }
}

pub(crate) fn new_image_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
