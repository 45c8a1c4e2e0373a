use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use serde_json::{Map, Value};

use crate::contract::model::DocId;

/// Document fields as stored remotely.
pub type Fields = Map<String, Value>;

/// Collections the application reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Items,
    History,
    Requests,
    ActivityLogs,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Users,
        Collection::Items,
        Collection::History,
        Collection::Requests,
        Collection::ActivityLogs,
    ];

    /// Remote collection name.
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Items => "items",
            Collection::History => "history",
            Collection::Requests => "requests",
            Collection::ActivityLogs => "activityLogs",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored document with its server-assigned creation time.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocId,
    pub fields: Fields,
    pub server_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Ordered/limited query. Ordering is by server time; unordered queries keep
/// insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Query {
    pub order: Option<SortOrder>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn newest_first(limit: usize) -> Self {
        Self {
            order: Some(SortOrder::Descending),
            limit: Some(limit),
        }
    }

    /// Apply ordering and limit to a full collection listing.
    pub fn apply(&self, docs: &[Document]) -> Vec<Document> {
        let mut out = docs.to_vec();
        match self.order {
            Some(SortOrder::Ascending) => out.sort_by(|a, b| a.server_time.cmp(&b.server_time)),
            Some(SortOrder::Descending) => out.sort_by(|a, b| b.server_time.cmp(&a.server_time)),
            None => {}
        }
        if let Some(limit) = self.limit {
            out.truncate(limit);
        }
        out
    }
}

/// Full current state of a (possibly queried) collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub collection: Collection,
    pub docs: Arc<[Document]>,
}

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

/// Stream of full snapshots. The first item is the state at subscription
/// time; later items may skip intermediate states.
pub type SnapshotStream = BoxStream<'static, Snapshot>;

/// One write inside an atomic batch
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Add {
        collection: Collection,
        fields: Fields,
    },
    Update {
        collection: Collection,
        id: DocId,
        patch: Fields,
    },
    Delete {
        collection: Collection,
        id: DocId,
    },
}

/// Writes applied all-or-nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, collection: Collection, fields: Fields) -> Self {
        self.ops.push(WriteOp::Add { collection, fields });
        self
    }

    pub fn update(mut self, collection: Collection, id: DocId, patch: Fields) -> Self {
        self.ops.push(WriteOp::Update {
            collection,
            id,
            patch,
        });
        self
    }

    pub fn delete(mut self, collection: Collection, id: DocId) -> Self {
        self.ops.push(WriteOp::Delete { collection, id });
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Port for the domain layer: the remote document store.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add a document; the store assigns id and server time.
    async fn add(&self, collection: Collection, fields: Fields) -> anyhow::Result<DocId>;
    /// Load one document.
    async fn get(&self, collection: Collection, id: &DocId) -> anyhow::Result<Option<Document>>;
    /// Merge `patch` into an existing document. Fails if it does not exist.
    async fn update(&self, collection: Collection, id: &DocId, patch: Fields)
        -> anyhow::Result<()>;
    /// Delete by id. Returns true if a document was deleted.
    async fn delete(&self, collection: Collection, id: &DocId) -> anyhow::Result<bool>;
    /// One-shot ordered/limited read.
    async fn query(&self, collection: Collection, query: Query) -> anyhow::Result<Vec<Document>>;
    /// Apply all writes atomically. Deletes of missing documents are no-ops.
    async fn commit(&self, batch: WriteBatch) -> anyhow::Result<()>;
    /// Live full-snapshot subscription.
    fn subscribe(&self, collection: Collection, query: Query) -> SnapshotStream;
}
