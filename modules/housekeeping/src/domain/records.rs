//! Persisted document schema.
//!
//! Field names follow the hosted collections the front-end already writes
//! (`fullName`, `roomNo`, `targetUserId`, ...). Records are decoded leniently:
//! a malformed document is skipped with a warning instead of poisoning the
//! whole snapshot.

use anyhow::Context;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::contract::model::{
    ActivityLog, ChecklistItem, DeletionRequest, HistoryRecord, RequestKind, Role, User,
};
use crate::domain::store::{Document, Fields};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub dob: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecordDoc {
    pub room_no: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub notes: String,
    // older clients wrote `user`
    #[serde(alias = "user")]
    pub user_name: String,
    pub progress: u32,
    pub total_items: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub target_user_id: String,
    pub target_user_name: String,
    pub requested_by: String,
    pub requested_by_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub user_id: String,
    pub user_name: String,
    pub user_role: String,
    pub action: String,
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
}

/// Serialize a record into document fields.
pub fn to_fields<T: Serialize>(record: &T) -> anyhow::Result<Fields> {
    match serde_json::to_value(record).context("record serialization failed")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("record serialized to non-object: {}", other),
    }
}

fn from_fields<T: DeserializeOwned>(doc: &Document) -> anyhow::Result<T> {
    serde_json::from_value(Value::Object(doc.fields.clone()))
        .with_context(|| format!("malformed document {}", doc.id))
}

/// Typed view over a stored document.
pub trait FromDocument: Sized {
    fn from_document(doc: &Document) -> anyhow::Result<Self>;
}

impl FromDocument for User {
    fn from_document(doc: &Document) -> anyhow::Result<Self> {
        let r: UserRecord = from_fields(doc)?;
        Ok(User {
            id: doc.id.clone(),
            username: r.username,
            full_name: r.full_name,
            email: r.email,
            phone: r.phone,
            dob: r.dob,
            password: r.password,
            role: r.role,
            created_at: Some(doc.server_time),
        })
    }
}

impl FromDocument for ChecklistItem {
    fn from_document(doc: &Document) -> anyhow::Result<Self> {
        let r: ItemRecord = from_fields(doc)?;
        Ok(ChecklistItem {
            id: doc.id.clone(),
            name: r.name,
            description: Some(r.description).filter(|d| !d.trim().is_empty()),
            created_at: Some(doc.server_time),
        })
    }
}

impl FromDocument for HistoryRecord {
    fn from_document(doc: &Document) -> anyhow::Result<Self> {
        let r: HistoryRecordDoc = from_fields(doc)?;
        Ok(HistoryRecord {
            id: doc.id.clone(),
            room_no: r.room_no,
            date: r.date,
            time: r.time,
            notes: r.notes,
            user_name: r.user_name,
            progress: r.progress,
            total_items: r.total_items,
            timestamp: doc.server_time,
        })
    }
}

impl FromDocument for DeletionRequest {
    fn from_document(doc: &Document) -> anyhow::Result<Self> {
        let r: RequestRecord = from_fields(doc)?;
        Ok(DeletionRequest {
            id: doc.id.clone(),
            kind: r.kind,
            target_user_id: r.target_user_id.into(),
            target_user_name: r.target_user_name,
            requested_by: r.requested_by,
            requested_by_name: r.requested_by_name,
            timestamp: doc.server_time,
        })
    }
}

impl FromDocument for ActivityLog {
    fn from_document(doc: &Document) -> anyhow::Result<Self> {
        let r: ActivityRecord = from_fields(doc)?;
        Ok(ActivityLog {
            id: doc.id.clone(),
            user_id: r.user_id,
            user_name: r.user_name,
            user_role: r.user_role,
            action: r.action,
            details: r.details,
            timestamp: doc.server_time,
            date: r.date,
            time: r.time,
        })
    }
}

/// Decode every well-formed document of a snapshot.
pub fn decode_all<T: FromDocument>(docs: &[Document]) -> Vec<T> {
    docs.iter()
        .filter_map(|doc| match T::from_document(doc) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(doc_id = %doc.id, error = %e, "Skipping malformed document");
                None
            }
        })
        .collect()
}
