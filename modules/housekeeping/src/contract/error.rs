use thiserror::Error;

use crate::contract::model::DocId;

/// Errors that are safe to expose to UIs and other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HousekeepingError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Unauthenticated: {message}")]
    Unauthenticated { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Unavailable: {message}")]
    Unavailable { message: String },

    #[error("Internal error")]
    Internal,
}

impl HousekeepingError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::Internal
    }

    /// Runtime task is gone; the handle can no longer be used.
    pub fn runtime_stopped() -> Self {
        Self::unavailable("housekeeping runtime is not running")
    }

    pub fn missing_user(id: &DocId) -> Self {
        Self::not_found(format!("user {}", id))
    }
}

impl From<crate::domain::error::DomainError> for HousekeepingError {
    fn from(domain_error: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match domain_error {
            Validation { field, message } => Self::validation(format!("{}: {}", field, message)),
            InvalidResetCode => Self::validation("Invalid reset code"),
            Duplicate { field, value } => {
                Self::conflict(format!("{} '{}' is already in use", field, value))
            }
            Forbidden { reason } => Self::forbidden(reason),
            NotSignedIn => Self::unauthenticated("not signed in"),
            InvalidCredentials => Self::unauthenticated("invalid email or password"),
            RosterNotLoaded => Self::unavailable("roster has not been loaded yet"),
            UserNotFound { id } => Self::missing_user(&id),
            ItemNotFound { id } => Self::not_found(format!("checklist item {}", id)),
            EmailNotFound { email } => Self::not_found(format!("no user with email {}", email)),
            Store { message } => Self::unavailable(message),
            Timeout { operation, after } => {
                Self::unavailable(format!("{} timed out after {:?}", operation, after))
            }
        }
    }
}
