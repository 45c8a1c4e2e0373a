#![allow(dead_code)]
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use housekeeping::{
    config::HousekeepingConfig,
    contract::{
        DocId, HousekeepingClient, HousekeepingError, Intent, IntentOutcome, Role, ViewModel,
    },
    domain::{
        ports::{Confirmer, LoadingIndicator, Notifier, SessionStorage, ToastKind},
        records::{to_fields, UserRecord},
        service::UiPorts,
        store::{
            Collection, Document, DocumentStore, Fields, Query, SnapshotStream, WriteBatch,
        },
    },
    infra::storage::InMemoryDocumentStore,
    module::HousekeepingPorts,
    Housekeeping,
};

pub const WAIT: Duration = Duration::from_secs(5);

#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<(ToastKind, String)>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<(ToastKind, String)> {
        self.toasts.lock().clone()
    }

    pub fn contains(&self, kind: ToastKind, needle: &str) -> bool {
        self.toasts
            .lock()
            .iter()
            .any(|(k, m)| *k == kind && m.contains(needle))
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: ToastKind, message: &str) {
        self.toasts.lock().push((kind, message.to_string()));
    }
}

#[derive(Default)]
pub struct CountingLoading {
    pub shown: AtomicUsize,
    pub hidden: AtomicUsize,
}

impl CountingLoading {
    pub fn balanced(&self) -> bool {
        self.shown.load(Ordering::SeqCst) == self.hidden.load(Ordering::SeqCst)
    }
}

impl LoadingIndicator for CountingLoading {
    fn show(&self, _message: &str) {
        self.shown.fetch_add(1, Ordering::SeqCst);
    }

    fn hide(&self) {
        self.hidden.fetch_add(1, Ordering::SeqCst);
    }
}

/// Answers queued replies first, then the default answer.
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<bool>>,
    default_answer: bool,
    asked: Mutex<Vec<(String, String)>>,
}

impl ScriptedConfirmer {
    pub fn new(default_answer: bool) -> Self {
        Self {
            answers: Mutex::new(VecDeque::new()),
            default_answer,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, answer: bool) {
        self.answers.lock().push_back(answer);
    }

    pub fn asked(&self) -> Vec<(String, String)> {
        self.asked.lock().clone()
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn ask(&self, message: &str, title: &str) -> bool {
        self.asked
            .lock()
            .push((message.to_string(), title.to_string()));
        self.answers
            .lock()
            .pop_front()
            .unwrap_or(self.default_answer)
    }
}

/// Store wrapper counting write calls, with optional latency on adds and
/// optional failure of activity log writes.
#[derive(Default)]
pub struct CountingStore {
    pub inner: InMemoryDocumentStore,
    pub deletes: AtomicUsize,
    pub commits: AtomicUsize,
    pub adds: AtomicUsize,
    add_delay: Mutex<Option<Duration>>,
    fail_activity: AtomicBool,
}

impl CountingStore {
    pub fn slow_adds(&self, delay: Duration) {
        *self.add_delay.lock() = Some(delay);
    }

    /// Make every `add` to the activity log collection fail.
    pub fn fail_activity_logs(&self) {
        self.fail_activity.store(true, Ordering::SeqCst);
    }

    pub fn writes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
            + self.commits.load(Ordering::SeqCst)
            + self.adds.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn add(&self, collection: Collection, fields: Fields) -> anyhow::Result<DocId> {
        self.adds.fetch_add(1, Ordering::SeqCst);
        let delay = *self.add_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if collection == Collection::ActivityLogs && self.fail_activity.load(Ordering::SeqCst) {
            anyhow::bail!("activity log unavailable");
        }
        self.inner.add(collection, fields).await
    }

    async fn get(&self, collection: Collection, id: &DocId) -> anyhow::Result<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn update(
        &self,
        collection: Collection,
        id: &DocId,
        patch: Fields,
    ) -> anyhow::Result<()> {
        self.inner.update(collection, id, patch).await
    }

    async fn delete(&self, collection: Collection, id: &DocId) -> anyhow::Result<bool> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(collection, id).await
    }

    async fn query(&self, collection: Collection, query: Query) -> anyhow::Result<Vec<Document>> {
        self.inner.query(collection, query).await
    }

    async fn commit(&self, batch: WriteBatch) -> anyhow::Result<()> {
        self.commits.fetch_add(1, Ordering::SeqCst);
        self.inner.commit(batch).await
    }

    fn subscribe(&self, collection: Collection, query: Query) -> SnapshotStream {
        self.inner.subscribe(collection, query)
    }
}

pub struct Harness {
    pub module: Housekeeping,
    pub client: Arc<dyn HousekeepingClient>,
    pub store: Arc<CountingStore>,
    pub notifier: Arc<RecordingNotifier>,
    pub loading: Arc<CountingLoading>,
    pub confirmer: Arc<ScriptedConfirmer>,
}

impl Harness {
    pub async fn start(store: Arc<CountingStore>) -> anyhow::Result<Self> {
        Self::start_with(store, HousekeepingConfig::default(), None).await
    }

    pub async fn start_with(
        store: Arc<CountingStore>,
        cfg: HousekeepingConfig,
        session: Option<Arc<dyn SessionStorage>>,
    ) -> anyhow::Result<Self> {
        let notifier = Arc::new(RecordingNotifier::default());
        let loading = Arc::new(CountingLoading::default());
        let confirmer = Arc::new(ScriptedConfirmer::new(true));

        let module = Housekeeping::default();
        module.init(
            &cfg,
            HousekeepingPorts {
                store: store.clone(),
                ui: UiPorts {
                    notifier: notifier.clone(),
                    loading: loading.clone(),
                    confirmer: confirmer.clone(),
                },
                session,
            },
        )?;
        let client = module.client()?;

        Ok(Self {
            module,
            client,
            store,
            notifier,
            loading,
            confirmer,
        })
    }

    pub async fn dispatch(
        &self,
        intent: Intent,
    ) -> Result<IntentOutcome, HousekeepingError> {
        self.client.dispatch(intent).await
    }

    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<()> {
        self.dispatch(Intent::Login {
            email: email.to_string(),
            password: password.to_string(),
        })
        .await?;
        Ok(())
    }

    pub async fn logout(&self) -> anyhow::Result<()> {
        self.confirmer.push(true);
        self.dispatch(Intent::Logout).await?;
        Ok(())
    }

    /// Wait until the published view satisfies `pred`.
    pub async fn wait_view<F>(&self, pred: F) -> anyhow::Result<ViewModel>
    where
        F: FnMut(&ViewModel) -> bool,
    {
        let mut rx = self.client.view();
        let view = tokio::time::timeout(WAIT, rx.wait_for(pred)).await??;
        Ok(view.clone())
    }

    /// Wait until the catalog has been seeded and projected.
    pub async fn wait_ready(&self) -> anyhow::Result<()> {
        wait_until(|| self.store.inner.len(Collection::Items) > 0).await
    }

    pub async fn activity_actions(&self) -> anyhow::Result<Vec<String>> {
        let docs = self
            .store
            .inner
            .query(Collection::ActivityLogs, Query::all())
            .await?;
        Ok(docs
            .iter()
            .filter_map(|d| d.fields.get("action").and_then(|a| a.as_str()))
            .map(str::to_string)
            .collect())
    }
}

/// Poll a synchronous condition until it holds.
pub async fn wait_until<F: Fn() -> bool>(cond: F) -> anyhow::Result<()> {
    tokio::time::timeout(WAIT, async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;
    Ok(())
}

pub async fn add_user(
    store: &CountingStore,
    username: &str,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<DocId> {
    let fields = to_fields(&UserRecord {
        username: username.to_string(),
        full_name: String::new(),
        email: email.to_string(),
        phone: "05551112233".to_string(),
        dob: String::new(),
        password: password.to_string(),
        role,
    })?;
    store.inner.add(Collection::Users, fields).await
}

/// A roster with one user per role, pre-populated before the runtime starts.
pub struct Roster {
    pub founder: DocId,
    pub admin: DocId,
    pub other_admin: DocId,
    pub staff: DocId,
}

pub const FOUNDER: (&str, &str) = ("kurucu@otel.com", "kurucu1");
pub const ADMIN: (&str, &str) = ("ali@otel.com", "admin11");
pub const OTHER_ADMIN: (&str, &str) = ("veli@otel.com", "admin22");
pub const STAFF: (&str, &str) = ("ayse@otel.com", "staff11");

pub async fn seed_roster(store: &CountingStore) -> anyhow::Result<Roster> {
    Ok(Roster {
        founder: add_user(store, "kurucu", FOUNDER.0, FOUNDER.1, Role::Founder).await?,
        admin: add_user(store, "ali", ADMIN.0, ADMIN.1, Role::Admin).await?,
        other_admin: add_user(store, "veli", OTHER_ADMIN.0, OTHER_ADMIN.1, Role::Admin).await?,
        staff: add_user(store, "ayse", STAFF.0, STAFF.1, Role::Staff).await?,
    })
}
