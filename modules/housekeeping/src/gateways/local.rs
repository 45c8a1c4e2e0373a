use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use tokio::sync::{mpsc, oneshot, watch};

use crate::contract::{
    client::HousekeepingClient,
    error::HousekeepingError,
    model::{Intent, IntentOutcome, ViewModel},
};
use crate::domain::events::HousekeepingEvent;
use crate::infra::events::BroadcastPublisher;
use crate::runtime::Command;

/// Local implementation of the HousekeepingClient trait that forwards intents
/// to the runtime task
#[derive(Clone)]
pub struct HousekeepingLocalClient {
    intents: mpsc::Sender<Command>,
    view: watch::Receiver<ViewModel>,
    events: BroadcastPublisher,
}

impl HousekeepingLocalClient {
    pub fn new(
        intents: mpsc::Sender<Command>,
        view: watch::Receiver<ViewModel>,
        events: BroadcastPublisher,
    ) -> Self {
        Self {
            intents,
            view,
            events,
        }
    }
}

#[async_trait]
impl HousekeepingClient for HousekeepingLocalClient {
    async fn dispatch(&self, intent: Intent) -> Result<IntentOutcome, HousekeepingError> {
        let (reply, rx) = oneshot::channel();
        self.intents
            .send(Command { intent, reply })
            .await
            .map_err(|_| HousekeepingError::runtime_stopped())?;
        rx.await.map_err(|_| HousekeepingError::runtime_stopped())?
    }

    fn view(&self) -> watch::Receiver<ViewModel> {
        self.view.clone()
    }

    fn events(&self) -> BoxStream<'static, HousekeepingEvent> {
        self.events.subscribe_stream().boxed()
    }
}
