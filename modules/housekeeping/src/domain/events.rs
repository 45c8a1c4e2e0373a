use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::contract::model::{DocId, Role};

/// Transport-agnostic domain event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HousekeepingEvent {
    SignedIn {
        user_id: DocId,
        role: Role,
        at: DateTime<Utc>,
    },
    SignedOut {
        at: DateTime<Utc>,
    },
    /// The signed-in user's record changed remotely
    SessionRefreshed { user_id: DocId, role: Role },
    /// The signed-in user's record disappeared; the UI should return to login
    SessionInvalidated {
        user_id: DocId,
        at: DateTime<Utc>,
    },
    FounderSeeded { id: DocId },
    DefaultItemsSeeded { count: usize },
    UserCreated { id: DocId, role: Role },
    UserDeleted { id: DocId, at: DateTime<Utc> },
    DeletionEscalated { request_id: DocId, target: DocId },
    RequestResolved { id: DocId, approved: bool },
    ItemCreated { id: DocId },
    ItemDeleted { id: DocId },
    RecordSubmitted { id: DocId, room_no: String },
    HistoryCleared { count: usize },
    PasswordReset { user_id: DocId },
}
