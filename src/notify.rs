// SPDX-License-Identifier: MPL-2.0

//! Transient notifications. Services fire toasts and move on; how they are
//! shown is up to the front end behind [`ToastSink`].

use crate::backend::BackendError;
use crate::messages;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: Option<String>,
}

impl Toast {
    pub fn info(title: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Info,
            title: title.into(),
            description: None,
        }
    }

    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            title: title.into(),
            description: Some(description.into()),
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: title.into(),
            description: Some(description.into()),
        }
    }

    /// Error toast for a failed backend call. Permission denials get the
    /// generic title; the details go to diagnostics, not the user.
    pub fn from_backend(title: &str, error: &BackendError) -> Self {
        let title = if error.is_permission_denied() {
            messages::PERMISSION_TITLE
        } else {
            title
        };
        Self::error(title, messages::backend_error(error))
    }
}

/// Fire-and-forget toast output.
pub trait ToastSink: Send + Sync {
    fn show(&self, toast: Toast);
}

/// Forwards toasts to a channel drained by the front end.
#[derive(Clone)]
pub struct ChannelToasts {
    tx: mpsc::UnboundedSender<Toast>,
}

impl ChannelToasts {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ToastSink for ChannelToasts {
    fn show(&self, toast: Toast) {
        if self.tx.send(toast).is_err() {
            tracing::debug!("toast receiver dropped");
        }
    }
}

/// Writes toasts to the log; used when no front end is attached.
pub struct LogToasts;

impl ToastSink for LogToasts {
    fn show(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => {
                tracing::warn!(title = %toast.title, description = ?toast.description, "toast")
            }
            _ => tracing::info!(title = %toast.title, description = ?toast.description, "toast"),
        }
    }
}
