// SPDX-License-Identifier: MPL-2.0

use crate::backend::{BackendError, Document};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub type Snapshot = Result<Vec<Document>, BackendError>;

/// Stream of query snapshots pushed by the backend.
///
/// Dropping the subscription stops the producing task; there is no separate
/// unsubscribe call to forget.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Snapshot>,
    producer: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(rx: mpsc::UnboundedReceiver<Snapshot>, producer: JoinHandle<()>) -> Self {
        Self {
            rx,
            producer: Some(producer),
        }
    }

    /// A subscription that yields a single error and then ends.
    pub fn failed(error: BackendError) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(Err(error));
        Self { rx, producer: None }
    }

    /// Next snapshot, or `None` once the backend stopped producing.
    pub async fn next(&mut self) -> Option<Snapshot> {
        self.rx.recv().await
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(producer) = self.producer.take() {
            producer.abort();
        }
    }
}
