use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::contract::model::{DeletionRequest, DocId};
use crate::domain::error::DomainError;
use crate::domain::records::{
    to_fields, ActivityRecord, FromDocument, HistoryRecordDoc, ItemRecord, RequestRecord,
    UserRecord,
};
use crate::domain::store::{
    Collection, DocumentStore, Fields, Query, SnapshotStream, WriteBatch,
};

/// Typed access to the housekeeping collections.
///
/// Every remote call is bounded by `timeout`; adapter errors become
/// `DomainError::Store`, elapsed calls become `DomainError::Timeout`.
#[derive(Clone)]
pub struct HousekeepingRepo {
    store: Arc<dyn DocumentStore>,
    timeout: Duration,
}

impl HousekeepingRepo {
    pub fn new(store: Arc<dyn DocumentStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub fn subscribe(&self, collection: Collection, query: Query) -> SnapshotStream {
        self.store.subscribe(collection, query)
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, DomainError>
    where
        F: Future<Output = anyhow::Result<T>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DomainError::store(format!("{operation}: {e:#}"))),
            Err(_) => Err(DomainError::timeout(operation, self.timeout)),
        }
    }

    fn encode<T: serde::Serialize>(record: &T) -> Result<Fields, DomainError> {
        to_fields(record).map_err(|e| DomainError::store(format!("{e:#}")))
    }

    // --- users ---

    pub async fn add_user(&self, record: &UserRecord) -> Result<DocId, DomainError> {
        let fields = Self::encode(record)?;
        self.bounded("users.add", self.store.add(Collection::Users, fields))
            .await
    }

    pub async fn delete_user(&self, id: &DocId) -> Result<bool, DomainError> {
        self.bounded("users.delete", self.store.delete(Collection::Users, id))
            .await
    }

    pub async fn set_password(&self, id: &DocId, password: &str) -> Result<(), DomainError> {
        let mut patch = Fields::new();
        patch.insert("password".to_string(), Value::String(password.to_string()));
        self.bounded("users.update", self.store.update(Collection::Users, id, patch))
            .await
    }

    // --- catalog ---

    pub async fn add_item(&self, record: &ItemRecord) -> Result<DocId, DomainError> {
        let fields = Self::encode(record)?;
        self.bounded("items.add", self.store.add(Collection::Items, fields))
            .await
    }

    pub async fn delete_item(&self, id: &DocId) -> Result<bool, DomainError> {
        self.bounded("items.delete", self.store.delete(Collection::Items, id))
            .await
    }

    /// Insert several catalog entries in one batch.
    pub async fn seed_items(&self, records: &[ItemRecord]) -> Result<usize, DomainError> {
        let mut batch = WriteBatch::new();
        for record in records {
            batch = batch.add(Collection::Items, Self::encode(record)?);
        }
        let count = batch.len();
        self.bounded("items.seed", self.store.commit(batch)).await?;
        Ok(count)
    }

    // --- history ---

    pub async fn add_history(&self, record: &HistoryRecordDoc) -> Result<DocId, DomainError> {
        let fields = Self::encode(record)?;
        self.bounded("history.add", self.store.add(Collection::History, fields))
            .await
    }

    /// Delete every history document in one batch; returns how many existed.
    pub async fn clear_history(&self) -> Result<usize, DomainError> {
        let docs = self
            .bounded(
                "history.list",
                self.store.query(Collection::History, Query::all()),
            )
            .await?;
        let batch = docs.iter().fold(WriteBatch::new(), |batch, doc| {
            batch.delete(Collection::History, doc.id.clone())
        });
        let count = batch.len();
        if count > 0 {
            self.bounded("history.clear", self.store.commit(batch))
                .await?;
        }
        debug!(count, "History documents deleted");
        Ok(count)
    }

    // --- deletion requests ---

    pub async fn add_request(&self, record: &RequestRecord) -> Result<DocId, DomainError> {
        let fields = Self::encode(record)?;
        self.bounded("requests.add", self.store.add(Collection::Requests, fields))
            .await
    }

    pub async fn get_request(&self, id: &DocId) -> Result<Option<DeletionRequest>, DomainError> {
        let doc = self
            .bounded("requests.get", self.store.get(Collection::Requests, id))
            .await?;
        doc.map(|d| DeletionRequest::from_document(&d))
            .transpose()
            .map_err(|e| DomainError::store(format!("{e:#}")))
    }

    pub async fn delete_request(&self, id: &DocId) -> Result<bool, DomainError> {
        self.bounded("requests.delete", self.store.delete(Collection::Requests, id))
            .await
    }

    /// Delete the request's target and the request itself atomically.
    pub async fn approve_request(&self, request: &DeletionRequest) -> Result<(), DomainError> {
        let batch = WriteBatch::new()
            .delete(Collection::Users, request.target_user_id.clone())
            .delete(Collection::Requests, request.id.clone());
        self.bounded("requests.approve", self.store.commit(batch))
            .await
    }

    // --- audit ---

    pub async fn add_activity(&self, record: &ActivityRecord) -> Result<DocId, DomainError> {
        let fields = Self::encode(record)?;
        self.bounded(
            "activityLogs.add",
            self.store.add(Collection::ActivityLogs, fields),
        )
        .await
    }
}
