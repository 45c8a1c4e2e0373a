use async_trait::async_trait;
use parking_lot::RwLock;

use crate::contract::model::User;
use crate::domain::ports::SessionStorage;

/// Session storage that lives as long as the process.
#[derive(Default)]
pub struct InMemorySessionStorage {
    user: RwLock<Option<User>>,
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn load(&self) -> anyhow::Result<Option<User>> {
        Ok(self.user.read().clone())
    }

    async fn save(&self, user: &User) -> anyhow::Result<()> {
        *self.user.write() = Some(user.clone());
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.user.write() = None;
        Ok(())
    }
}
