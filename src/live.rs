// SPDX-License-Identifier: MPL-2.0

//! Reactive views over live backend queries.
//!
//! A [`LiveQuery`] owns at most one subscription. Pointing it at a new query
//! drops the old subscription before opening the next one, and dropping the
//! wrapper stops listening altogether. Consumers read the current
//! [`LiveState`] or await changes through a `watch` receiver.

use crate::backend::{BackendError, Document, DocumentPath, DocumentStore, Query, Subscription};
use crate::diagnostics;
use crate::model::Record;
use crate::runtime;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct LiveState<D> {
    pub data: D,
    pub is_loading: bool,
    pub error: Option<BackendError>,
}

impl<D: Default> LiveState<D> {
    fn idle() -> Self {
        Self {
            data: D::default(),
            is_loading: false,
            error: None,
        }
    }

    fn loading() -> Self {
        Self {
            data: D::default(),
            is_loading: true,
            error: None,
        }
    }
}

/// Something a live view can listen to.
trait Source: Clone + PartialEq + Send + 'static {
    fn open(&self, store: &dyn DocumentStore) -> Subscription;
}

impl Source for Query {
    fn open(&self, store: &dyn DocumentStore) -> Subscription {
        store.subscribe(self.clone())
    }
}

impl Source for DocumentPath {
    fn open(&self, store: &dyn DocumentStore) -> Subscription {
        store.subscribe_document(self.clone())
    }
}

struct Live<K, D> {
    store: Arc<dyn DocumentStore>,
    state: Arc<watch::Sender<LiveState<D>>>,
    key: Option<K>,
    decode: fn(Vec<Document>) -> D,
    pump: Option<JoinHandle<()>>,
}

impl<K, D> Live<K, D>
where
    K: Source,
    D: Default + Clone + Send + Sync + 'static,
{
    fn new(store: Arc<dyn DocumentStore>, decode: fn(Vec<Document>) -> D) -> Self {
        let (tx, _) = watch::channel(LiveState::idle());
        Self {
            store,
            state: Arc::new(tx),
            key: None,
            decode,
            pump: None,
        }
    }

    fn set(&mut self, key: Option<K>) {
        if self.key == key {
            return;
        }
        self.stop();
        self.key = key.clone();

        let Some(key) = key else {
            self.state.send_replace(LiveState::idle());
            return;
        };

        self.state.send_replace(LiveState::loading());
        let mut subscription = key.open(self.store.as_ref());
        let state = self.state.clone();
        let decode = self.decode;
        self.pump = Some(runtime::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                match snapshot {
                    Ok(docs) => {
                        state.send_replace(LiveState {
                            data: decode(docs),
                            is_loading: false,
                            error: None,
                        });
                    }
                    Err(e) => {
                        diagnostics::report(&e);
                        state.send_modify(|s| {
                            s.is_loading = false;
                            s.error = Some(e);
                        });
                    }
                }
            }
        }));
    }

    fn stop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

impl<K, D> Drop for Live<K, D> {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

fn decode_all<T: Record>(docs: Vec<Document>) -> Vec<T> {
    docs.into_iter().filter_map(decode_one).collect()
}

fn decode_first<T: Record>(docs: Vec<Document>) -> Option<T> {
    docs.into_iter().next().and_then(decode_one)
}

fn decode_one<T: Record>(doc: Document) -> Option<T> {
    let id = doc.id.clone();
    match T::from_document(doc) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(id = %id, error = %e, "skipping undecodable document");
            None
        }
    }
}

/// Live, typed query results.
pub struct LiveQuery<T: Record> {
    inner: Live<Query, Vec<T>>,
}

impl<T: Record> LiveQuery<T> {
    pub fn new(store: Arc<dyn DocumentStore>, query: Option<Query>) -> Self {
        let mut inner = Live::new(store, decode_all::<T>);
        inner.set(query);
        Self { inner }
    }

    /// Switch to another query. An identical query keeps the current
    /// subscription; `None` stops listening and clears the state.
    pub fn set_query(&mut self, query: Option<Query>) {
        self.inner.set(query);
    }

    pub fn query(&self) -> Option<&Query> {
        self.inner.key.as_ref()
    }

    pub fn state(&self) -> LiveState<Vec<T>> {
        self.inner.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<LiveState<Vec<T>>> {
        self.inner.state.subscribe()
    }

    /// Wait until the first snapshot (or an error) has arrived.
    pub async fn loaded(&self) -> LiveState<Vec<T>> {
        let mut rx = self.watch();
        match rx.wait_for(|s| !s.is_loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }
}

/// Live, typed single document. `data` is `None` while loading and when the
/// document does not exist.
pub struct LiveDocument<T: Record> {
    inner: Live<DocumentPath, Option<T>>,
}

impl<T: Record> LiveDocument<T> {
    pub fn new(store: Arc<dyn DocumentStore>, path: Option<DocumentPath>) -> Self {
        let mut inner = Live::new(store, decode_first::<T>);
        inner.set(path);
        Self { inner }
    }

    pub fn set_path(&mut self, path: Option<DocumentPath>) {
        self.inner.set(path);
    }

    pub fn path(&self) -> Option<&DocumentPath> {
        self.inner.key.as_ref()
    }

    pub fn state(&self) -> LiveState<Option<T>> {
        self.inner.state.borrow().clone()
    }

    pub fn current(&self) -> Option<T> {
        self.inner.state.borrow().data.clone()
    }

    pub fn watch(&self) -> watch::Receiver<LiveState<Option<T>>> {
        self.inner.state.subscribe()
    }

    pub async fn loaded(&self) -> LiveState<Option<T>> {
        let mut rx = self.watch();
        match rx.wait_for(|s| !s.is_loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        }
    }
}
