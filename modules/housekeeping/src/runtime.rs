//! The application event loop.
//!
//! One task owns all client state (session, projection, checklist filter,
//! pending password reset). It consumes collection snapshots and UI intents
//! strictly one at a time and publishes a fresh `ViewModel` after each step.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::Fuse;
use futures::StreamExt;
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::contract::error::HousekeepingError;
use crate::contract::model::{
    ChecklistFilter, DeletionOutcome, Intent, IntentOutcome, Role, SignedInUser, ViewModel,
};
use crate::domain::authz;
use crate::domain::error::DomainError;
use crate::domain::events::HousekeepingEvent;
use crate::domain::password_reset::PasswordReset;
use crate::domain::ports::{EventPublisher, Notifier, ToastKind};
use crate::domain::projection::{self, Projection};
use crate::domain::records::decode_all;
use crate::domain::seed::FounderSeed;
use crate::domain::service::Service;
use crate::domain::session::Resync;
use crate::domain::store::{Collection, Query, Snapshot, SnapshotStream};
use crate::domain::view_gate;

pub type Reply = oneshot::Sender<Result<IntentOutcome, HousekeepingError>>;

/// An intent together with the channel its outcome is sent back on.
#[derive(Debug)]
pub struct Command {
    pub intent: Intent,
    pub reply: Reply,
}

#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub history_limit: usize,
    /// Founder created on the first empty roster snapshot; `None` disables it.
    pub founder: Option<FounderSeed>,
    pub seed_default_items: bool,
}

#[derive(Default)]
struct AppState {
    projection: Projection,
    filter: ChecklistFilter,
    search: String,
    reset: PasswordReset,
    founder_seeded: bool,
    items_seeded: bool,
}

pub struct HousekeepingRuntime {
    service: Service,
    events: Arc<dyn EventPublisher<HousekeepingEvent>>,
    notifier: Arc<dyn Notifier>,
    settings: RuntimeSettings,
    view_tx: watch::Sender<ViewModel>,
    state: AppState,
}

type SubscriptionStream = Fuse<SnapshotStream>;

async fn next_or_pending(stream: &mut Option<SubscriptionStream>) -> Option<Snapshot> {
    match stream {
        Some(s) => s.next().await,
        None => std::future::pending().await,
    }
}

impl HousekeepingRuntime {
    pub fn new(
        service: Service,
        events: Arc<dyn EventPublisher<HousekeepingEvent>>,
        notifier: Arc<dyn Notifier>,
        settings: RuntimeSettings,
        view_tx: watch::Sender<ViewModel>,
    ) -> Self {
        Self {
            service,
            events,
            notifier,
            settings,
            view_tx,
            state: AppState::default(),
        }
    }

    fn subscribe(&self, collection: Collection, query: Query) -> SubscriptionStream {
        self.service.repo().subscribe(collection, query).fuse()
    }

    /// Run until `cancel` fires or every client handle is dropped.
    pub async fn run(mut self, mut intents: mpsc::Receiver<Command>, cancel: CancellationToken) {
        if let Some(user) = self.service.session().restore().await {
            info!(user_id = %user.id, "Resuming persisted session");
        }

        let mut users = self.subscribe(Collection::Users, Query::all());
        let mut items = self.subscribe(Collection::Items, Query::all());
        let mut history = self.subscribe(
            Collection::History,
            Query::newest_first(self.settings.history_limit),
        );
        let mut requests: Option<SubscriptionStream> = None;
        self.sync_requests_subscription(&mut requests);
        self.publish_view();

        info!("Housekeeping runtime started");
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                Some(snapshot) = users.next() => self.on_users(snapshot).await,
                Some(snapshot) = items.next() => self.on_items(snapshot).await,
                Some(snapshot) = history.next() => self.on_history(snapshot),
                Some(snapshot) = next_or_pending(&mut requests) => self.on_requests(snapshot),
                command = intents.recv() => match command {
                    Some(command) => self.on_command(command).await,
                    None => {
                        debug!("All client handles dropped");
                        break;
                    }
                },
            }
            self.sync_requests_subscription(&mut requests);
            self.publish_view();
        }
        info!("Housekeeping runtime stopped");
    }

    /// The requests collection is only streamed while a founder is signed in.
    fn sync_requests_subscription(&mut self, requests: &mut Option<SubscriptionStream>) {
        let founder = self.service.session().role() == Some(Role::Founder);
        match (founder, requests.is_some()) {
            (true, false) => {
                debug!("Subscribing to deletion requests");
                *requests = Some(self.subscribe(Collection::Requests, Query::all()));
            }
            (false, true) => {
                debug!("Dropping deletion request subscription");
                *requests = None;
                self.state.projection.clear_requests();
            }
            _ => {}
        }
    }

    // --- snapshots ---

    async fn on_users(&mut self, snapshot: Snapshot) {
        if snapshot.is_empty() && !self.state.founder_seeded {
            if let Some(founder) = self.settings.founder.clone() {
                self.state.founder_seeded = true;
                if let Err(e) = self.service.seed_founder(&founder).await {
                    error!(error = %e, "Founder bootstrap failed");
                }
            }
        }

        self.state.projection.apply_users(decode_all(&snapshot.docs));

        match self
            .service
            .session()
            .resync(&self.state.projection.users)
            .await
        {
            Resync::Refreshed(user) => {
                debug!(user_id = %user.id, "Session refreshed from roster");
                self.events.publish(&HousekeepingEvent::SessionRefreshed {
                    user_id: user.id.clone(),
                    role: user.role,
                });
            }
            Resync::Invalidated(user) => {
                info!(user_id = %user.id, "Session user no longer in roster; signing out");
                self.notifier
                    .notify(ToastKind::Warning, "Oturumunuz sonlandırıldı.");
                self.events.publish(&HousekeepingEvent::SessionInvalidated {
                    user_id: user.id.clone(),
                    at: Utc::now(),
                });
            }
            Resync::Unchanged | Resync::NoSession => {}
        }
    }

    async fn on_items(&mut self, snapshot: Snapshot) {
        if snapshot.is_empty() && !self.state.items_seeded && self.settings.seed_default_items {
            self.state.items_seeded = true;
            if let Err(e) = self.service.seed_default_items().await {
                error!(error = %e, "Default checklist bootstrap failed");
            }
        }
        self.state.projection.apply_items(decode_all(&snapshot.docs));
    }

    fn on_history(&mut self, snapshot: Snapshot) {
        self.state.projection.apply_history(decode_all(&snapshot.docs));
    }

    fn on_requests(&mut self, snapshot: Snapshot) {
        self.state
            .projection
            .apply_requests(decode_all(&snapshot.docs));
    }

    // --- intents ---

    async fn on_command(&mut self, command: Command) {
        let result = self.handle(command.intent).await;
        if let Err(e) = &result {
            debug!(error = %e, "Intent failed");
            self.notifier.error(&e.user_message());
        }
        if command.reply.send(result.map_err(Into::into)).is_err() {
            debug!("Intent caller went away before the reply");
        }
    }

    async fn handle(&mut self, intent: Intent) -> Result<IntentOutcome, DomainError> {
        let local = &mut self.state.projection;
        match intent {
            Intent::Login { email, password } => {
                let user = self
                    .service
                    .login(&local.users, &email, &password)
                    .await?;
                Ok(IntentOutcome::SignedIn(SignedInUser::from(user.as_ref())))
            }
            Intent::Logout => Ok(match self.service.logout().await? {
                Some(()) => IntentOutcome::SignedOut,
                None => IntentOutcome::Cancelled,
            }),
            Intent::SetItemStatus { name, status } => {
                authz::signed_in(self.service.session().current().as_deref())?;
                if !projection::toggle(&mut local.checklist, &name, status) {
                    return Err(DomainError::validation(
                        "name",
                        format!("\"{name}\" listede yok"),
                    ));
                }
                Ok(IntentOutcome::Applied)
            }
            Intent::MarkAllDone => {
                authz::signed_in(self.service.session().current().as_deref())?;
                projection::mark_all_done(&mut local.checklist);
                self.notifier
                    .success("Tüm öğeler tamamlandı olarak işaretlendi!");
                Ok(IntentOutcome::Applied)
            }
            Intent::SetFilter(filter) => {
                self.state.filter = filter;
                Ok(IntentOutcome::Applied)
            }
            Intent::SetSearch(search) => {
                self.state.search = search;
                Ok(IntentOutcome::Applied)
            }
            Intent::SubmitRecord(form) => {
                let id = self.service.submit_record(local, form).await?;
                local.reset_checklist();
                Ok(IntentOutcome::Created(id))
            }
            Intent::ClearHistory => Ok(match self.service.clear_history().await? {
                Some(_) => IntentOutcome::Applied,
                None => IntentOutcome::Cancelled,
            }),
            Intent::AddUser(form) => {
                let id = self.service.add_user(&local.users, form).await?;
                Ok(IntentOutcome::Created(id))
            }
            Intent::DeleteUser { id } => {
                let outcome = self.service.delete_user(&local.users, &id).await?;
                Ok(match outcome {
                    DeletionOutcome::Cancelled => IntentOutcome::Cancelled,
                    other => IntentOutcome::Deletion(other),
                })
            }
            Intent::ResolveRequest { id, approve } => {
                let resolution = self
                    .service
                    .resolve_request(&local.users, &id, approve)
                    .await?;
                Ok(IntentOutcome::Resolution(resolution))
            }
            Intent::AddItem(form) => {
                let id = self.service.add_item(&local.catalog, form).await?;
                Ok(IntentOutcome::Created(id))
            }
            Intent::DeleteItem { id } => Ok(
                match self.service.delete_item(&local.catalog, &id).await? {
                    Some(()) => IntentOutcome::Applied,
                    None => IntentOutcome::Cancelled,
                },
            ),
            Intent::RequestPasswordReset { email } => {
                let code = self.service.request_password_reset(
                    &mut self.state.reset,
                    &local.users,
                    &email,
                )?;
                Ok(IntentOutcome::ResetCodeIssued { code })
            }
            Intent::CompletePasswordReset {
                code,
                new_password,
                confirm_password,
            } => {
                self.service
                    .complete_password_reset(
                        &mut self.state.reset,
                        &local.users,
                        &code,
                        &new_password,
                        &confirm_password,
                    )
                    .await?;
                Ok(IntentOutcome::Applied)
            }
        }
    }

    // --- view ---

    fn view(&self) -> ViewModel {
        let user = self.service.session().current();
        let role = user.as_ref().map(|u| u.role);
        let affordances = view_gate::affordances(role);
        let local = &self.state.projection;
        let signed_in = user.as_deref().map(SignedInUser::from);
        let visible = signed_in.is_some();

        ViewModel {
            signed_in,
            affordances,
            filter: self.state.filter,
            search: self.state.search.clone(),
            checklist: if visible {
                projection::visible(&local.checklist, self.state.filter, &self.state.search)
            } else {
                Vec::new()
            },
            progress: local.progress(),
            history: if visible {
                local.history.clone()
            } else {
                Vec::new()
            },
            roster: view_gate::roster_rows(&local.users, role),
            catalog: if affordances.admin_panel {
                local.catalog.clone()
            } else {
                Vec::new()
            },
            inbox: if affordances.founder_inbox {
                local.requests.clone()
            } else {
                Vec::new()
            },
            pending_requests: affordances
                .pending_counter
                .then(|| local.requests.len()),
        }
    }

    fn publish_view(&self) {
        let next = self.view();
        self.view_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }
}
