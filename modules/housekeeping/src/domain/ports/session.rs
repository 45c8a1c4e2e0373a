use async_trait::async_trait;

use crate::contract::model::User;

/// Port for persisting the signed-in user across reloads.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Load the persisted user, if any.
    async fn load(&self) -> anyhow::Result<Option<User>>;
    /// Persist (or replace) the signed-in user.
    async fn save(&self, user: &User) -> anyhow::Result<()>;
    /// Forget the persisted user. Clearing an empty storage is not an error.
    async fn clear(&self) -> anyhow::Result<()>;
}
