// SPDX-License-Identifier: MPL-2.0

//! Where background work runs.
//!
//! Subscription pumps and polling loops join the caller's tokio runtime when
//! there is one. Synchronous front ends without a runtime get a small shared
//! one instead.

use once_cell::sync::Lazy;
use std::future::Future;
use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;

const THREAD_NAME: &str = "unsch-connect-bg";

static SHARED: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .thread_name(THREAD_NAME)
        .build()
        .expect("failed to create background runtime")
});

/// Spawn a background task on the current runtime, or on the shared one when
/// called from plain threads.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    match Handle::try_current() {
        Ok(handle) => handle.spawn(future),
        Err(_) => SHARED.spawn(future),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    fn thread_name() -> Option<String> {
        std::thread::current().name().map(str::to_string)
    }

    #[test]
    fn plain_threads_use_the_shared_runtime() {
        let (tx, rx) = mpsc::channel();
        spawn(async move {
            let _ = tx.send(thread_name());
        });
        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some(THREAD_NAME));
    }

    #[tokio::test]
    async fn async_callers_keep_their_own_runtime() {
        let name = spawn(async { thread_name() }).await.unwrap();
        assert_ne!(name.as_deref(), Some(THREAD_NAME));
    }
}
