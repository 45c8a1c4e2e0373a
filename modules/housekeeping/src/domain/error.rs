use std::time::Duration;

use thiserror::Error;

use crate::contract::model::DocId;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("'{value}' is already in use ({field})")]
    Duplicate { field: String, value: String },

    #[error("Not authorized: {reason}")]
    Forbidden { reason: String },

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Roster has not been loaded yet")]
    RosterNotLoaded,

    #[error("User not found: {id}")]
    UserNotFound { id: DocId },

    #[error("Checklist item not found: {id}")]
    ItemNotFound { id: DocId },

    #[error("No user with email '{email}'")]
    EmailNotFound { email: String },

    #[error("Invalid reset code")]
    InvalidResetCode,

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Remote call '{operation}' timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn user_not_found(id: DocId) -> Self {
        Self::UserNotFound { id }
    }

    pub fn item_not_found(id: DocId) -> Self {
        Self::ItemNotFound { id }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    pub fn timeout(operation: &'static str, after: Duration) -> Self {
        Self::Timeout { operation, after }
    }

    /// Validation-class errors are rejected before any remote call.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Duplicate { .. } | Self::InvalidResetCode
        )
    }

    /// Text for the error toast shown to the acting user.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, .. } => message.clone(),
            Self::Duplicate { field, .. } => match field.as_str() {
                "username" => "Bu kullanıcı adı zaten kullanımda!".to_string(),
                "email" => "Bu e-posta adresi zaten kullanımda!".to_string(),
                "name" => "Bu öğe zaten listede var!".to_string(),
                _ => self.to_string(),
            },
            Self::Forbidden { reason } => reason.clone(),
            Self::NotSignedIn => "Lütfen önce giriş yapın.".to_string(),
            Self::InvalidCredentials => "Hatalı E-Posta veya Şifre!".to_string(),
            Self::RosterNotLoaded => {
                "Veritabanı henüz yüklenmedi, lütfen saniyeler sonra tekrar deneyin.".to_string()
            }
            Self::UserNotFound { .. } | Self::EmailNotFound { .. } => {
                "Kullanıcı bulunamadı.".to_string()
            }
            Self::ItemNotFound { .. } => "Öğe bulunamadı.".to_string(),
            Self::InvalidResetCode => "Hatalı Kod".to_string(),
            Self::Store { .. } | Self::Timeout { .. } => {
                format!("İşlem tamamlanamadı: {self}")
            }
        }
    }
}
