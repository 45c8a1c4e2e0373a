use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::HousekeepingConfig;
use crate::contract::client::HousekeepingClient;
use crate::contract::model::ViewModel;
use crate::domain::ports::SessionStorage;
use crate::domain::repo::HousekeepingRepo;
use crate::domain::service::{Service, ServiceConfig, UiPorts};
use crate::domain::session::SessionStore;
use crate::domain::store::DocumentStore;
use crate::gateways::local::HousekeepingLocalClient;
use crate::infra::events::BroadcastPublisher;
use crate::infra::session::{FileSessionStorage, InMemorySessionStorage};
use crate::runtime::{HousekeepingRuntime, RuntimeSettings};

/// External collaborators the module is wired against.
#[derive(Clone)]
pub struct HousekeepingPorts {
    pub store: Arc<dyn DocumentStore>,
    pub ui: UiPorts,
    /// Overrides the storage chosen from `session_file`.
    pub session: Option<Arc<dyn SessionStorage>>,
}

/// Module handle: owns the runtime task and hands out clients.
#[derive(Default)]
pub struct Housekeeping {
    client: ArcSwapOption<HousekeepingLocalClient>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Housekeeping {
    /// Wire the ports and spawn the runtime. Must be called from within a
    /// tokio runtime.
    pub fn init(&self, cfg: &HousekeepingConfig, ports: HousekeepingPorts) -> anyhow::Result<()> {
        info!("Initializing housekeeping module");
        if self.client.load().is_some() {
            anyhow::bail!("housekeeping module already initialized");
        }
        debug!(
            "Loaded housekeeping config: remote_timeout_ms={}, history_limit={}",
            cfg.remote_timeout_ms, cfg.history_limit
        );

        let session_storage: Arc<dyn SessionStorage> = match (ports.session, &cfg.session_file) {
            (Some(storage), _) => storage,
            (None, Some(path)) => Arc::new(FileSessionStorage::new(path.clone())),
            (None, None) => Arc::new(InMemorySessionStorage::default()),
        };

        let events = BroadcastPublisher::new(cfg.view_channel_capacity);
        let repo = HousekeepingRepo::new(ports.store, cfg.remote_timeout());
        let service = Service::new(
            repo,
            Arc::new(SessionStore::new(session_storage)),
            ports.ui.clone(),
            Arc::new(events.clone()),
            ServiceConfig::default(),
        );

        let (view_tx, view_rx) = watch::channel(ViewModel::default());
        let (intent_tx, intent_rx) = mpsc::channel(cfg.view_channel_capacity.max(1));

        let runtime = HousekeepingRuntime::new(
            service,
            Arc::new(events.clone()),
            ports.ui.notifier,
            RuntimeSettings {
                history_limit: cfg.history_limit,
                founder: Some(cfg.bootstrap.founder_seed()),
                seed_default_items: cfg.seed_default_items,
            },
            view_tx,
        );

        let handle = tokio::spawn(runtime.run(intent_rx, self.cancel.clone()));
        *self.task.lock() = Some(handle);

        self.client.store(Some(Arc::new(HousekeepingLocalClient::new(
            intent_tx, view_rx, events,
        ))));
        info!("Housekeeping client ready");
        Ok(())
    }

    pub fn client(&self) -> anyhow::Result<Arc<dyn HousekeepingClient>> {
        let client = self
            .client
            .load_full()
            .ok_or_else(|| anyhow::anyhow!("Housekeeping module not initialized"))?;
        Ok(client)
    }

    /// Stop the runtime and wait for it to finish.
    pub async fn stop(&self) {
        self.cancel.cancel();
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "Housekeeping runtime task failed");
            }
        }
        self.client.store(None);
        info!("Housekeeping module stopped");
    }
}
