use std::collections::HashMap;
use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::trace;

use crate::contract::model::DocId;
use crate::domain::store::{
    Collection, Document, DocumentStore, Fields, Query, Snapshot, SnapshotStream, WriteBatch,
    WriteOp,
};

/// In-process document store with live snapshot subscriptions.
///
/// Each collection publishes its full contents on a `watch` channel after
/// every committed write, so slow subscribers see the latest state and skip
/// intermediate ones. Server times are strictly increasing.
#[derive(Clone)]
pub struct InMemoryDocumentStore {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<State>,
    channels: HashMap<Collection, watch::Sender<Arc<[Document]>>>,
}

#[derive(Default)]
struct State {
    docs: HashMap<Collection, Vec<Document>>,
    last_time: Option<DateTime<Utc>>,
}

impl State {
    fn next_time(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let t = match self.last_time {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_time = Some(t);
        t
    }

    fn docs_mut(&mut self, collection: Collection) -> &mut Vec<Document> {
        self.docs.entry(collection).or_default()
    }

    fn contains(&self, collection: Collection, id: &DocId) -> bool {
        self.docs
            .get(&collection)
            .is_some_and(|docs| docs.iter().any(|d| &d.id == id))
    }

    fn insert(&mut self, collection: Collection, fields: Fields) -> DocId {
        let id = DocId::generate();
        let server_time = self.next_time();
        self.docs_mut(collection).push(Document {
            id: id.clone(),
            fields,
            server_time,
        });
        id
    }

    fn patch(&mut self, collection: Collection, id: &DocId, patch: Fields) -> bool {
        match self.docs_mut(collection).iter_mut().find(|d| &d.id == id) {
            Some(doc) => {
                doc.fields.extend(patch);
                true
            }
            None => false,
        }
    }

    fn remove(&mut self, collection: Collection, id: &DocId) -> bool {
        let docs = self.docs_mut(collection);
        let before = docs.len();
        docs.retain(|d| &d.id != id);
        docs.len() != before
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        let channels = Collection::ALL
            .iter()
            .map(|c| {
                let empty: Arc<[Document]> = Arc::from(Vec::new());
                (*c, watch::channel(empty).0)
            })
            .collect();
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                channels,
            }),
        }
    }

    /// Number of documents currently stored in a collection.
    pub fn len(&self, collection: Collection) -> usize {
        self.inner
            .state
            .lock()
            .docs
            .get(&collection)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    /// Publish the current contents of `collections` to their subscribers.
    fn publish(&self, state: &State, collections: &[Collection]) {
        for collection in collections {
            let docs: Arc<[Document]> = state
                .docs
                .get(collection)
                .map(|d| Arc::from(d.as_slice()))
                .unwrap_or_else(|| Arc::from(Vec::new()));
            if let Some(tx) = self.inner.channels.get(collection) {
                trace!(collection = %collection, count = docs.len(), "Publishing snapshot");
                tx.send_replace(docs);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn add(&self, collection: Collection, fields: Fields) -> anyhow::Result<DocId> {
        let mut state = self.inner.state.lock();
        let id = state.insert(collection, fields);
        self.publish(&state, &[collection]);
        Ok(id)
    }

    async fn get(&self, collection: Collection, id: &DocId) -> anyhow::Result<Option<Document>> {
        let state = self.inner.state.lock();
        Ok(state
            .docs
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| &d.id == id).cloned()))
    }

    async fn update(
        &self,
        collection: Collection,
        id: &DocId,
        patch: Fields,
    ) -> anyhow::Result<()> {
        let mut state = self.inner.state.lock();
        if !state.patch(collection, id, patch) {
            bail!("no document {} in {}", id, collection);
        }
        self.publish(&state, &[collection]);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &DocId) -> anyhow::Result<bool> {
        let mut state = self.inner.state.lock();
        let removed = state.remove(collection, id);
        if removed {
            self.publish(&state, &[collection]);
        }
        Ok(removed)
    }

    async fn query(&self, collection: Collection, query: Query) -> anyhow::Result<Vec<Document>> {
        let state = self.inner.state.lock();
        Ok(state
            .docs
            .get(&collection)
            .map(|docs| query.apply(docs))
            .unwrap_or_default())
    }

    async fn commit(&self, batch: WriteBatch) -> anyhow::Result<()> {
        let mut state = self.inner.state.lock();

        // Reject the whole batch before touching anything.
        for op in batch.ops() {
            if let WriteOp::Update { collection, id, .. } = op {
                if !state.contains(*collection, id) {
                    bail!("batch update of missing document {} in {}", id, collection);
                }
            }
        }

        let mut touched = Vec::new();
        for op in batch.into_ops() {
            let collection = match op {
                WriteOp::Add { collection, fields } => {
                    state.insert(collection, fields);
                    collection
                }
                WriteOp::Update {
                    collection,
                    id,
                    patch,
                } => {
                    state.patch(collection, &id, patch);
                    collection
                }
                WriteOp::Delete { collection, id } => {
                    state.remove(collection, &id);
                    collection
                }
            };
            if !touched.contains(&collection) {
                touched.push(collection);
            }
        }

        self.publish(&state, &touched);
        Ok(())
    }

    fn subscribe(&self, collection: Collection, query: Query) -> SnapshotStream {
        let rx = match self.inner.channels.get(&collection) {
            Some(tx) => tx.subscribe(),
            None => {
                let empty: Arc<[Document]> = Arc::from(Vec::new());
                watch::channel(empty).1
            }
        };
        WatchStream::new(rx)
            .map(move |docs| Snapshot {
                collection,
                docs: query.apply(&docs).into(),
            })
            .boxed()
    }
}
