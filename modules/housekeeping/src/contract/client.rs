use async_trait::async_trait;
use futures::stream::BoxStream;
use tokio::sync::watch;

use crate::contract::{
    error::HousekeepingError,
    model::{Intent, IntentOutcome, ViewModel},
};
use crate::domain::events::HousekeepingEvent;

/// Public API of the housekeeping module for UIs and other modules
#[async_trait]
pub trait HousekeepingClient: Send + Sync {
    /// Submit a user intent and wait until the runtime has handled it
    async fn dispatch(&self, intent: Intent) -> Result<IntentOutcome, HousekeepingError>;

    /// Latest render-ready state; changes whenever the runtime republishes it
    fn view(&self) -> watch::Receiver<ViewModel>;

    /// Domain events published from now on
    fn events(&self) -> BoxStream<'static, HousekeepingEvent>;
}
