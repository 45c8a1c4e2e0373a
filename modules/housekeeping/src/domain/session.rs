use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{debug, warn};

use crate::contract::model::{Role, User};
use crate::domain::ports::SessionStorage;

/// Result of re-resolving the session against a roster snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Resync {
    NoSession,
    Unchanged,
    /// The record changed; the session now holds the new version.
    Refreshed(Arc<User>),
    /// The record is gone; the session has been cleared.
    Invalidated(Arc<User>),
}

/// The authenticated user, mirrored to a `SessionStorage`.
///
/// Storage failures never fail a session change; they are logged and the
/// in-memory session stays authoritative.
pub struct SessionStore {
    current: ArcSwapOption<User>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            current: ArcSwapOption::empty(),
            storage,
        }
    }

    /// Load a persisted session, if any.
    pub async fn restore(&self) -> Option<Arc<User>> {
        match self.storage.load().await {
            Ok(Some(user)) => {
                debug!(user_id = %user.id, "Restored persisted session");
                let user = Arc::new(user);
                self.current.store(Some(user.clone()));
                Some(user)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Failed to load persisted session");
                None
            }
        }
    }

    pub fn current(&self) -> Option<Arc<User>> {
        self.current.load_full()
    }

    pub fn role(&self) -> Option<Role> {
        self.current.load().as_ref().map(|u| u.role)
    }

    pub async fn set(&self, user: User) -> Arc<User> {
        if let Err(e) = self.storage.save(&user).await {
            warn!(user_id = %user.id, error = %e, "Failed to persist session");
        }
        let user = Arc::new(user);
        self.current.store(Some(user.clone()));
        user
    }

    pub async fn clear(&self) -> Option<Arc<User>> {
        if let Err(e) = self.storage.clear().await {
            warn!(error = %e, "Failed to clear persisted session");
        }
        self.current.swap(None)
    }

    /// Re-resolve the session user by exact email match in `users`.
    pub async fn resync(&self, users: &[User]) -> Resync {
        let Some(current) = self.current() else {
            return Resync::NoSession;
        };

        match users.iter().find(|u| u.email == current.email) {
            Some(fresh) if fresh == current.as_ref() => Resync::Unchanged,
            Some(fresh) => Resync::Refreshed(self.set(fresh.clone()).await),
            None => {
                if users
                    .iter()
                    .any(|u| u.email.trim().eq_ignore_ascii_case(current.email.trim()))
                {
                    // Login matches case-insensitively, re-resolution does not.
                    warn!(
                        user_id = %current.id,
                        "Session email differs from roster only by case; session dropped"
                    );
                }
                self.clear().await;
                Resync::Invalidated(current)
            }
        }
    }
}
