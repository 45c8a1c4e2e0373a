//! Simulated two-step password reset.
//!
//! The code is shown to the requester directly instead of being delivered
//! out of band, and it never expires. Both are known gaps of the simulation.

use rand::Rng;

use crate::contract::model::{DocId, User};
use crate::domain::error::DomainError;

const CODE_RANGE: std::ops::RangeInclusive<u32> = 100_000..=999_999;

pub fn generate_code() -> String {
    rand::rng().random_range(CODE_RANGE).to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingReset {
    user_id: DocId,
    code: String,
}

/// At most one reset in flight; a new request replaces the previous one.
#[derive(Debug, Default)]
pub struct PasswordReset {
    pending: Option<PendingReset>,
}

impl PasswordReset {
    /// Step 1: issue a code for the user whose email matches exactly.
    pub fn begin(&mut self, users: &[User], email: &str) -> Result<String, DomainError> {
        let user = users
            .iter()
            .find(|u| u.email == email)
            .ok_or_else(|| DomainError::EmailNotFound {
                email: email.to_string(),
            })?;

        let code = generate_code();
        self.pending = Some(PendingReset {
            user_id: user.id.clone(),
            code: code.clone(),
        });
        Ok(code)
    }

    /// Step 2: check the code and the confirmation; returns the target user.
    /// The reset stays pending until `consume` is called.
    pub fn verify(
        &self,
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<DocId, DomainError> {
        let pending = self
            .pending
            .as_ref()
            .filter(|p| p.code == code)
            .ok_or(DomainError::InvalidResetCode)?;

        if new_password != confirm_password {
            return Err(DomainError::validation(
                "confirm_password",
                "Şifre eşleşmiyor",
            ));
        }
        Ok(pending.user_id.clone())
    }

    pub fn consume(&mut self) {
        self.pending = None;
    }
}
