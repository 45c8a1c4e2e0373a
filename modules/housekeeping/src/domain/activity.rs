//! Fire-and-forget audit trail in the `activityLogs` collection.

use std::fmt;

use chrono::Local;
use serde_json::Value;
use tracing::{debug, warn};

use crate::contract::model::{DocId, User};
use crate::domain::records::ActivityRecord;
use crate::domain::repo::HousekeepingRepo;
use crate::domain::store::Fields;

/// Audited actions. Labels are the stored wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityAction {
    Login,
    LoginAttempt,
    Logout,
    UserAdded,
    UserDeleted,
    UserDeletedOnRequest,
    DeletionRequested,
    ItemAdded,
    ItemDeleted,
    RecordSubmitted,
    HistoryCleared,
    PasswordReset,
}

impl ActivityAction {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityAction::Login => "Giriş Yaptı",
            ActivityAction::LoginAttempt => "Giriş Denemesi",
            ActivityAction::Logout => "Çıkış Yaptı",
            ActivityAction::UserAdded => "Kullanıcı Ekledi",
            ActivityAction::UserDeleted => "Kullanıcı Sildi",
            ActivityAction::UserDeletedOnRequest => "Talep Üzerine Sildi",
            ActivityAction::DeletionRequested => "Silme Talebi Gönderdi",
            ActivityAction::ItemAdded => "Öğe Ekledi",
            ActivityAction::ItemDeleted => "Öğe Sildi",
            ActivityAction::RecordSubmitted => "Oda Kaydı Oluşturdu",
            ActivityAction::HistoryCleared => "Geçmişi Temizledi",
            ActivityAction::PasswordReset => "Şifre Sıfırladı",
        }
    }

    /// Only failed logins are recorded without a signed-in actor.
    pub fn allows_anonymous(&self) -> bool {
        matches!(self, ActivityAction::LoginAttempt)
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Turn a `json!({...})` literal into a details map; non-objects become empty.
pub fn details(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

/// Build the stored record, or `None` when the action needs an actor.
pub fn build_record(
    actor: Option<&User>,
    action: ActivityAction,
    details: Fields,
) -> Option<ActivityRecord> {
    if actor.is_none() && !action.allows_anonymous() {
        return None;
    }

    let now = Local::now();
    let (user_id, user_name, user_role) = match actor {
        Some(user) => (
            user.id.to_string(),
            user.display_name().to_string(),
            user.role.to_string(),
        ),
        None => (
            "Unauthenticated".to_string(),
            details
                .get("attemptedEmail")
                .and_then(Value::as_str)
                .unwrap_or("Unknown")
                .to_string(),
            "N/A".to_string(),
        ),
    };

    Some(ActivityRecord {
        user_id,
        user_name,
        user_role,
        action: action.label().to_string(),
        details,
        date: now.format("%d.%m.%Y").to_string(),
        time: now.format("%H:%M").to_string(),
    })
}

/// Appends audit records. Never fails the caller.
#[derive(Clone)]
pub struct ActivityLogger {
    repo: HousekeepingRepo,
}

impl ActivityLogger {
    pub fn new(repo: HousekeepingRepo) -> Self {
        Self { repo }
    }

    pub async fn log(
        &self,
        actor: Option<&User>,
        action: ActivityAction,
        details: Fields,
    ) -> Option<DocId> {
        let Some(record) = build_record(actor, action, details) else {
            debug!(action = %action, "Skipping activity log without an actor");
            return None;
        };

        match self.repo.add_activity(&record).await {
            Ok(id) => {
                debug!(action = %action, log_id = %id, "Activity recorded");
                Some(id)
            }
            Err(e) => {
                warn!(action = %action, error = %e, "Failed to record activity");
                None
            }
        }
    }
}
