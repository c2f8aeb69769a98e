// SPDX-License-Identifier: MPL-2.0

//! Process-wide sink for backend failures worth a developer's attention.
//! Permission denials are broadcast with their full context so a debug
//! overlay can show which rule rejected which request.

use crate::backend::{BackendError, PermissionContext};
use once_cell::sync::Lazy;
use tokio::sync::broadcast;

static PERMISSION_ERRORS: Lazy<broadcast::Sender<PermissionContext>> =
    Lazy::new(|| broadcast::channel(64).0);

/// Log an error and, for permission denials, publish its context.
pub fn report(error: &BackendError) {
    match error.permission_context() {
        Some(context) => {
            tracing::error!(
                path = %context.path,
                operation = %context.operation,
                payload = ?context.payload,
                "permission denied"
            );
            // No receivers is fine.
            let _ = PERMISSION_ERRORS.send(context.clone());
        }
        None => tracing::warn!(error = %error, "backend operation failed"),
    }
}

pub fn subscribe() -> broadcast::Receiver<PermissionContext> {
    PERMISSION_ERRORS.subscribe()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Operation;
    use serial_test::serial;

    #[test]
    #[serial]
    fn permission_denials_are_broadcast() {
        let mut rx = subscribe();

        report(&BackendError::Network("offline".into()));
        report(&BackendError::PermissionDenied(PermissionContext::new(
            "posts/p1",
            Operation::Update,
        )));

        let mut seen = Vec::new();
        while let Ok(context) = rx.try_recv() {
            seen.push(context);
        }
        assert!(
            seen.iter()
                .any(|c| c.path == "posts/p1" && c.operation == Operation::Update)
        );
        assert!(seen.iter().all(|c| c.path != "offline"));
    }
}
