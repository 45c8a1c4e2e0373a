use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque document identifier assigned by the document store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id in the style of hosted document stores.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DocId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Roster roles, ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Checklist work and history submission only
    Staff,
    /// Catalog and non-admin roster management
    Admin,
    /// Everything, including resolving escalated deletions; undeletable
    Founder,
}

impl Role {
    /// Permission level (higher = more permissions)
    pub fn level(&self) -> u8 {
        match self {
            Role::Founder => 3,
            Role::Admin => 2,
            Role::Staff => 1,
        }
    }

    pub fn is_privileged(&self) -> bool {
        matches!(self, Role::Admin | Role::Founder)
    }

    /// Label shown in greetings and role badges.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Founder => "Kurucu",
            Role::Admin => "Yönetici",
            Role::Staff => "Personel",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Staff => write!(f, "staff"),
            Role::Admin => write!(f, "admin"),
            Role::Founder => write!(f, "founder"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            "founder" => Ok(Role::Founder),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// A roster member.
///
/// The password is stored and compared in plaintext. This mirrors the hosted
/// data it is read from and is a known security defect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: DocId,
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub password: String,
    pub role: Role,
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Full name, falling back to the username.
    pub fn display_name(&self) -> &str {
        if self.full_name.trim().is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }
}

/// Form data for a roster addition
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub dob: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Option<Role>,
}

/// Catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: DocId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewChecklistItem {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemStatus {
    #[serde(rename = "done")]
    Done,
    #[serde(rename = "not-done")]
    NotDone,
}

/// Session-local completion status for one catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItemState {
    pub name: String,
    pub status: Option<ItemStatus>,
}

impl ChecklistItemState {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == Some(ItemStatus::Done)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistFilter {
    #[default]
    All,
    Incomplete,
    Done,
}

/// Completion summary of the current checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Progress {
    pub done: usize,
    pub total: usize,
    pub percent: u8,
}

/// Submitted room completion record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: DocId,
    pub room_no: String,
    pub date: String,
    pub time: String,
    pub notes: String,
    pub user_name: String,
    /// Number of items marked done at submission time
    pub progress: u32,
    pub total_items: u32,
    pub timestamp: DateTime<Utc>,
}

impl HistoryRecord {
    pub fn is_complete(&self) -> bool {
        self.progress == self.total_items
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewHistoryRecord {
    pub room_no: String,
    pub date: String,
    pub time: String,
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    #[serde(rename = "delete_user")]
    DeleteUser,
}

/// Pending request for the founder to delete an admin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionRequest {
    pub id: DocId,
    pub kind: RequestKind,
    pub target_user_id: DocId,
    pub target_user_name: String,
    pub requested_by: String,
    pub requested_by_name: String,
    pub timestamp: DateTime<Utc>,
}

/// Audit record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: DocId,
    pub user_id: String,
    pub user_name: String,
    pub user_role: String,
    pub action: String,
    pub details: serde_json::Map<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
    pub date: String,
    pub time: String,
}

/// UI affordances visible for a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Affordances {
    pub admin_panel: bool,
    pub history_clear: bool,
    pub founder_inbox: bool,
    pub pending_counter: bool,
    pub delete_users: bool,
}

/// One roster table row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    pub id: DocId,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub role: Role,
    /// Founder rows are protected
    pub deletable: bool,
}

/// Render-ready state published after every runtime step.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ViewModel {
    pub signed_in: Option<SignedInUser>,
    pub affordances: Affordances,
    pub filter: ChecklistFilter,
    pub search: String,
    /// Filtered checklist, in collation order
    pub checklist: Vec<ChecklistItemState>,
    /// Progress over the whole checklist, regardless of filter
    pub progress: Progress,
    pub history: Vec<HistoryRecord>,
    pub roster: Vec<RosterRow>,
    pub catalog: Vec<ChecklistItem>,
    pub inbox: Vec<DeletionRequest>,
    pub pending_requests: Option<usize>,
}

/// Public part of the session identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedInUser {
    pub id: DocId,
    pub display_name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for SignedInUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            display_name: user.display_name().to_string(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// User intent emitted by a UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Login { email: String, password: String },
    Logout,
    SetItemStatus { name: String, status: ItemStatus },
    MarkAllDone,
    SetFilter(ChecklistFilter),
    SetSearch(String),
    SubmitRecord(NewHistoryRecord),
    ClearHistory,
    AddUser(NewUser),
    DeleteUser { id: DocId },
    ResolveRequest { id: DocId, approve: bool },
    AddItem(NewChecklistItem),
    DeleteItem { id: DocId },
    RequestPasswordReset { email: String },
    CompletePasswordReset {
        code: String,
        new_password: String,
        confirm_password: String,
    },
}

/// Result of deleting a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted { id: DocId },
    /// A request was submitted to the founder instead
    Escalated { request_id: DocId },
    /// The acting user declined the confirmation
    Cancelled,
}

/// Result of resolving a deletion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Approved { user_deleted: bool },
    Rejected,
    /// The request was already resolved or removed
    AlreadyResolved,
}

/// What an intent did, as seen by the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentOutcome {
    Applied,
    SignedIn(SignedInUser),
    SignedOut,
    Cancelled,
    Created(DocId),
    Deletion(DeletionOutcome),
    Resolution(Resolution),
    /// Simulated flow: the code is shown directly to the requester
    ResetCodeIssued { code: String },
}
