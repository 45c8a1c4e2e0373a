//! Role hierarchy checks for mutations.

use crate::contract::model::{Role, User};
use crate::domain::error::DomainError;

/// Outcome of evaluating a user deletion before any prompt or store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionDecision {
    /// The actor may delete the target directly (after confirmation).
    Execute,
    /// The actor must ask the founder instead (after confirmation).
    Escalate,
    Denied(DenyReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// The founder account can never be deleted or targeted by a request.
    ProtectedFounder,
    NotAuthorized,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::ProtectedFounder => "Kurucu hesabı silinemez.",
            DenyReason::NotAuthorized => "Bu işlem için yetkiniz yok.",
        }
    }
}

impl From<DenyReason> for DomainError {
    fn from(reason: DenyReason) -> Self {
        DomainError::forbidden(reason.message())
    }
}

/// Decide how `actor` may delete a user holding `target`.
pub fn evaluate_user_deletion(actor: Role, target: Role) -> DeletionDecision {
    match (actor, target) {
        (_, Role::Founder) => DeletionDecision::Denied(DenyReason::ProtectedFounder),
        (Role::Staff, _) => DeletionDecision::Denied(DenyReason::NotAuthorized),
        (Role::Admin, Role::Admin) => DeletionDecision::Escalate,
        (Role::Admin, Role::Staff) | (Role::Founder, Role::Staff | Role::Admin) => {
            DeletionDecision::Execute
        }
    }
}

/// Require a signed-in actor.
pub fn signed_in(actor: Option<&User>) -> Result<&User, DomainError> {
    actor.ok_or(DomainError::NotSignedIn)
}

/// Require an admin or founder actor (catalog, roster and history clearing).
pub fn privileged(actor: Option<&User>) -> Result<&User, DomainError> {
    let user = signed_in(actor)?;
    if user.role.is_privileged() {
        Ok(user)
    } else {
        Err(DenyReason::NotAuthorized.into())
    }
}

/// Require the founder (resolving escalated requests).
pub fn founder(actor: Option<&User>) -> Result<&User, DomainError> {
    let user = signed_in(actor)?;
    if user.role == Role::Founder {
        Ok(user)
    } else {
        Err(DenyReason::NotAuthorized.into())
    }
}

/// Roles that may be granted through the roster form. The founder exists only
/// through bootstrap.
pub fn assignable_role(role: Role) -> Result<Role, DomainError> {
    match role {
        Role::Staff | Role::Admin => Ok(role),
        Role::Founder => Err(DomainError::validation(
            "role",
            "founder role cannot be assigned",
        )),
    }
}
