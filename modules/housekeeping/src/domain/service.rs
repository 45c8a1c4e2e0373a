use std::sync::Arc;

use chrono::{Local, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::contract::model::{
    ChecklistItem, DeletionOutcome, DocId, NewChecklistItem, NewHistoryRecord, NewUser,
    RequestKind, Resolution, Role, User,
};
use crate::domain::activity::{details, ActivityAction, ActivityLogger};
use crate::domain::authz::{self, DeletionDecision};
use crate::domain::error::DomainError;
use crate::domain::events::HousekeepingEvent;
use crate::domain::password_reset::PasswordReset;
use crate::domain::ports::ui::DEFAULT_CONFIRM_TITLE;
use crate::domain::ports::{Confirmer, EventPublisher, LoadingGuard, LoadingIndicator, Notifier};
use crate::domain::projection::{self, Projection};
use crate::domain::records::{HistoryRecordDoc, ItemRecord, RequestRecord, UserRecord};
use crate::domain::repo::HousekeepingRepo;
use crate::domain::seed::{self, FounderSeed};
use crate::domain::session::SessionStore;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// Configuration for the domain service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub min_password_len: usize,
    pub min_phone_digits: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            min_password_len: 6,
            min_phone_digits: 10,
        }
    }
}

/// Interactive collaborators of the mutation layer.
#[derive(Clone)]
pub struct UiPorts {
    pub notifier: Arc<dyn Notifier>,
    pub loading: Arc<dyn LoadingIndicator>,
    pub confirmer: Arc<dyn Confirmer>,
}

/// Authorization-gated mutations. Every mutation validates input and checks
/// the actor's role before the first remote call, and every remote call runs
/// under a loading guard.
///
/// Operations that ask for confirmation return `Ok(None)` when the user
/// declines; nothing is written in that case.
#[derive(Clone)]
pub struct Service {
    repo: HousekeepingRepo,
    activity: ActivityLogger,
    session: Arc<SessionStore>,
    ui: UiPorts,
    events: Arc<dyn EventPublisher<HousekeepingEvent>>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(
        repo: HousekeepingRepo,
        session: Arc<SessionStore>,
        ui: UiPorts,
        events: Arc<dyn EventPublisher<HousekeepingEvent>>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            activity: ActivityLogger::new(repo.clone()),
            repo,
            session,
            ui,
            events,
            config,
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn repo(&self) -> &HousekeepingRepo {
        &self.repo
    }

    fn actor(&self) -> Option<Arc<User>> {
        self.session.current()
    }

    fn loading(&self, message: &str) -> LoadingGuard<'_> {
        LoadingGuard::show(self.ui.loading.as_ref(), message)
    }

    async fn confirm(&self, message: &str, title: &str) -> bool {
        let ok = self.ui.confirmer.ask(message, title).await;
        if !ok {
            debug!("Confirmation declined");
        }
        ok
    }

    // --- session ---

    #[instrument(name = "housekeeping.service.login", skip(self, users, password), fields(email = %email))]
    pub async fn login(
        &self,
        users: &[User],
        email: &str,
        password: &str,
    ) -> Result<Arc<User>, DomainError> {
        if users.is_empty() {
            return Err(DomainError::RosterNotLoaded);
        }

        let wanted = email.trim().to_lowercase();
        let Some(user) = users
            .iter()
            .find(|u| u.email.trim().to_lowercase() == wanted && u.password == password)
        else {
            info!("Login rejected");
            self.activity
                .log(
                    None,
                    ActivityAction::LoginAttempt,
                    details(json!({ "attemptedEmail": email.trim(), "success": false })),
                )
                .await;
            return Err(DomainError::InvalidCredentials);
        };

        let _loading = self.loading("Giriş Yapılıyor...");
        let user = self.session.set(user.clone()).await;
        self.activity
            .log(Some(user.as_ref()), ActivityAction::Login, Default::default())
            .await;
        self.events.publish(&HousekeepingEvent::SignedIn {
            user_id: user.id.clone(),
            role: user.role,
            at: Utc::now(),
        });
        self.ui.notifier.success("Giriş başarılı! Hoş geldiniz.");
        info!(user_id = %user.id, role = %user.role, "Signed in");
        Ok(user)
    }

    #[instrument(name = "housekeeping.service.logout", skip(self))]
    pub async fn logout(&self) -> Result<Option<()>, DomainError> {
        let actor = self.actor();
        let actor = authz::signed_in(actor.as_deref())?;

        if !self
            .confirm("Çıkış yapmak istediğinize emin misiniz?", DEFAULT_CONFIRM_TITLE)
            .await
        {
            return Ok(None);
        }

        let _loading = self.loading("Sistemden Çıkış Yapılıyor...");
        self.activity
            .log(Some(actor), ActivityAction::Logout, Default::default())
            .await;
        self.session.clear().await;
        self.events
            .publish(&HousekeepingEvent::SignedOut { at: Utc::now() });
        info!(user_id = %actor.id, "Signed out");
        Ok(Some(()))
    }

    // --- history ---

    #[instrument(name = "housekeeping.service.submit_record", skip(self, projection, form), fields(room_no = %form.room_no))]
    pub async fn submit_record(
        &self,
        projection: &Projection,
        form: NewHistoryRecord,
    ) -> Result<DocId, DomainError> {
        let actor = self.actor();
        let actor = authz::signed_in(actor.as_deref())?;

        let room_no = form.room_no.trim().to_string();
        if room_no.is_empty() {
            return Err(DomainError::validation("room_no", "Oda numarası gerekli"));
        }

        let progress = projection::progress(&projection.checklist);
        let now = Local::now();
        let record = HistoryRecordDoc {
            room_no: room_no.clone(),
            date: non_empty_or(form.date, || now.format("%Y-%m-%d").to_string()),
            time: non_empty_or(form.time, || now.format("%H:%M").to_string()),
            notes: form.notes,
            user_name: actor.display_name().to_string(),
            progress: progress.done as u32,
            total_items: progress.total as u32,
        };

        let id = {
            let _loading = self.loading("Kayıt kaydediliyor...");
            let id = self.repo.add_history(&record).await?;
            self.activity
                .log(
                    Some(actor),
                    ActivityAction::RecordSubmitted,
                    details(json!({ "roomNo": room_no, "progress": format!("{}%", progress.percent) })),
                )
                .await;
            id
        };

        self.events.publish(&HousekeepingEvent::RecordSubmitted {
            id: id.clone(),
            room_no,
        });
        self.ui.notifier.success("Kayıt başarıyla eklendi!");
        info!(record_id = %id, done = progress.done, total = progress.total, "Room record submitted");
        Ok(id)
    }

    #[instrument(name = "housekeeping.service.clear_history", skip(self))]
    pub async fn clear_history(&self) -> Result<Option<usize>, DomainError> {
        let actor = self.actor();
        let actor = authz::privileged(actor.as_deref())?;

        if !self
            .confirm("Tüm geçmiş silinsin mi? (Geri alınamaz)", DEFAULT_CONFIRM_TITLE)
            .await
        {
            return Ok(None);
        }

        let count = {
            let _loading = self.loading("Geçmiş temizleniyor...");
            let count = self.repo.clear_history().await?;
            self.activity
                .log(Some(actor), ActivityAction::HistoryCleared, Default::default())
                .await;
            count
        };

        self.events
            .publish(&HousekeepingEvent::HistoryCleared { count });
        self.ui.notifier.success("Geçmiş temizlendi.");
        info!(count, "History cleared");
        Ok(Some(count))
    }

    // --- roster ---

    #[instrument(
        name = "housekeeping.service.add_user",
        skip(self, users, form),
        fields(username = %form.username, email = %form.email)
    )]
    pub async fn add_user(&self, users: &[User], form: NewUser) -> Result<DocId, DomainError> {
        let actor = self.actor();
        let actor = authz::privileged(actor.as_deref())?;

        let record = self.validate_new_user(form)?;
        if users.iter().any(|u| u.username == record.username) {
            return Err(DomainError::duplicate("username", record.username));
        }
        if users.iter().any(|u| u.email == record.email) {
            return Err(DomainError::duplicate("email", record.email));
        }

        let id = {
            let _loading = self.loading("Kullanıcı ekleniyor...");
            let id = self.repo.add_user(&record).await?;
            self.activity
                .log(
                    Some(actor),
                    ActivityAction::UserAdded,
                    details(json!({ "newUser": record.username, "role": record.role })),
                )
                .await;
            id
        };

        self.events.publish(&HousekeepingEvent::UserCreated {
            id: id.clone(),
            role: record.role,
        });
        self.ui.notifier.success("Kullanıcı başarıyla eklendi!");
        info!(user_id = %id, role = %record.role, "User added");
        Ok(id)
    }

    /// Delete a roster member, escalating admin-on-admin deletions to the
    /// founder.
    #[instrument(name = "housekeeping.service.delete_user", skip(self, users), fields(user_id = %id))]
    pub async fn delete_user(
        &self,
        users: &[User],
        id: &DocId,
    ) -> Result<DeletionOutcome, DomainError> {
        let actor = self.actor();
        let actor = authz::signed_in(actor.as_deref())?;
        let target = users
            .iter()
            .find(|u| &u.id == id)
            .ok_or_else(|| DomainError::user_not_found(id.clone()))?;

        match authz::evaluate_user_deletion(actor.role, target.role) {
            DeletionDecision::Denied(reason) => {
                info!(target_role = %target.role, "User deletion denied");
                Err(reason.into())
            }
            DeletionDecision::Escalate => self.escalate_deletion(actor, target).await,
            DeletionDecision::Execute => self.execute_deletion(actor, target).await,
        }
    }

    async fn escalate_deletion(
        &self,
        actor: &User,
        target: &User,
    ) -> Result<DeletionOutcome, DomainError> {
        let message = format!(
            "Yönetici \"@{}\" silme yetkiniz yok. Kurucuya onay isteği gönderilsin mi?",
            target.username
        );
        if !self.confirm(&message, "Yetki Kısıtlı").await {
            return Ok(DeletionOutcome::Cancelled);
        }

        let request = RequestRecord {
            kind: RequestKind::DeleteUser,
            target_user_id: target.id.to_string(),
            target_user_name: target.username.clone(),
            requested_by: actor.username.clone(),
            requested_by_name: actor.display_name().to_string(),
        };

        let request_id = {
            let _loading = self.loading("Talep iletiliyor...");
            let request_id = self.repo.add_request(&request).await?;
            self.activity
                .log(
                    Some(actor),
                    ActivityAction::DeletionRequested,
                    details(json!({ "targetUser": target.username })),
                )
                .await;
            request_id
        };

        self.events.publish(&HousekeepingEvent::DeletionEscalated {
            request_id: request_id.clone(),
            target: target.id.clone(),
        });
        self.ui.notifier.success("Talebiniz kurucuya iletildi.");
        info!(request_id = %request_id, "User deletion escalated to founder");
        Ok(DeletionOutcome::Escalated { request_id })
    }

    async fn execute_deletion(
        &self,
        actor: &User,
        target: &User,
    ) -> Result<DeletionOutcome, DomainError> {
        let message = format!(
            "\"{}\" kullanıcısını silmek istediğinize emin misiniz?",
            target.display_name()
        );
        if !self.confirm(&message, DEFAULT_CONFIRM_TITLE).await {
            return Ok(DeletionOutcome::Cancelled);
        }

        {
            let _loading = self.loading("Kullanıcı siliniyor...");
            if !self.repo.delete_user(&target.id).await? {
                return Err(DomainError::user_not_found(target.id.clone()));
            }
            self.activity
                .log(
                    Some(actor),
                    ActivityAction::UserDeleted,
                    details(json!({ "deletedUser": target.username })),
                )
                .await;
        }

        self.events.publish(&HousekeepingEvent::UserDeleted {
            id: target.id.clone(),
            at: Utc::now(),
        });
        self.ui.notifier.success("Kullanıcı başarıyla silindi!");
        info!(target_role = %target.role, "User deleted");
        Ok(DeletionOutcome::Deleted {
            id: target.id.clone(),
        })
    }

    /// Founder decision on an escalated deletion. The request is removed
    /// either way; approval deletes the target in the same batch.
    #[instrument(name = "housekeeping.service.resolve_request", skip(self, users), fields(request_id = %id))]
    pub async fn resolve_request(
        &self,
        users: &[User],
        id: &DocId,
        approve: bool,
    ) -> Result<Resolution, DomainError> {
        let actor = self.actor();
        let actor = authz::founder(actor.as_deref())?;

        let _loading = self.loading(if approve {
            "İşlem Onaylanıyor..."
        } else {
            "İşlem Reddediliyor..."
        });

        let Some(request) = self.repo.get_request(id).await? else {
            info!("Request already resolved");
            self.ui.notifier.info("Bu talep zaten sonuçlandırılmış.");
            return Ok(Resolution::AlreadyResolved);
        };

        let resolution = if !approve {
            self.repo.delete_request(&request.id).await?;
            self.ui.notifier.info("İstek reddedildi.");
            Resolution::Rejected
        } else {
            match users.iter().find(|u| u.id == request.target_user_id) {
                Some(target) if target.role == Role::Founder => {
                    return Err(authz::DenyReason::ProtectedFounder.into());
                }
                Some(_) => {
                    self.repo.approve_request(&request).await?;
                    self.activity
                        .log(
                            Some(actor),
                            ActivityAction::UserDeletedOnRequest,
                            details(json!({
                                "deletedUser": request.target_user_name,
                                "requestedBy": request.requested_by,
                            })),
                        )
                        .await;
                    self.events.publish(&HousekeepingEvent::UserDeleted {
                        id: request.target_user_id.clone(),
                        at: Utc::now(),
                    });
                    self.ui
                        .notifier
                        .success("İşlem onaylandı ve kullanıcı silindi.");
                    Resolution::Approved { user_deleted: true }
                }
                None => {
                    warn!(target = %request.target_user_id, "Request target no longer exists");
                    self.repo.delete_request(&request.id).await?;
                    self.ui
                        .notifier
                        .info("Kullanıcı zaten silinmiş; talep kaldırıldı.");
                    Resolution::Approved {
                        user_deleted: false,
                    }
                }
            }
        };

        self.events.publish(&HousekeepingEvent::RequestResolved {
            id: request.id.clone(),
            approved: approve,
        });
        info!(?resolution, "Request resolved");
        Ok(resolution)
    }

    // --- catalog ---

    #[instrument(name = "housekeeping.service.add_item", skip(self, catalog, form), fields(name = %form.name))]
    pub async fn add_item(
        &self,
        catalog: &[ChecklistItem],
        form: NewChecklistItem,
    ) -> Result<DocId, DomainError> {
        let actor = self.actor();
        let actor = authz::privileged(actor.as_deref())?;

        let name = form.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name", "Öğe adı boş olamaz!"));
        }
        if catalog.iter().any(|i| i.name == name) {
            return Err(DomainError::duplicate("name", name));
        }
        let record = ItemRecord {
            name,
            description: form
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
        };

        let id = {
            let _loading = self.loading("Öğe ekleniyor...");
            let id = self.repo.add_item(&record).await?;
            self.activity
                .log(
                    Some(actor),
                    ActivityAction::ItemAdded,
                    details(json!({ "itemName": record.name })),
                )
                .await;
            id
        };

        self.events
            .publish(&HousekeepingEvent::ItemCreated { id: id.clone() });
        self.ui.notifier.success("Öğe başarıyla eklendi!");
        info!(item_id = %id, "Checklist item added");
        Ok(id)
    }

    #[instrument(name = "housekeeping.service.delete_item", skip(self, catalog), fields(item_id = %id))]
    pub async fn delete_item(
        &self,
        catalog: &[ChecklistItem],
        id: &DocId,
    ) -> Result<Option<()>, DomainError> {
        let actor = self.actor();
        let actor = authz::privileged(actor.as_deref())?;
        let item = catalog
            .iter()
            .find(|i| &i.id == id)
            .ok_or_else(|| DomainError::item_not_found(id.clone()))?;

        let message = format!(
            "\"{}\" öğesini listeden kaldırmak istediğinize emin misiniz?",
            item.name
        );
        if !self.confirm(&message, "Öğe Silme").await {
            return Ok(None);
        }

        {
            let _loading = self.loading("Öğe siliniyor...");
            if !self.repo.delete_item(id).await? {
                return Err(DomainError::item_not_found(id.clone()));
            }
            self.activity
                .log(
                    Some(actor),
                    ActivityAction::ItemDeleted,
                    details(json!({ "itemName": item.name })),
                )
                .await;
        }

        self.events
            .publish(&HousekeepingEvent::ItemDeleted { id: id.clone() });
        self.ui.notifier.success("Öğe başarıyla kaldırıldı.");
        info!("Checklist item deleted");
        Ok(Some(()))
    }

    // --- password reset ---

    #[instrument(name = "housekeeping.service.request_password_reset", skip(self, reset, users), fields(email = %email))]
    pub fn request_password_reset(
        &self,
        reset: &mut PasswordReset,
        users: &[User],
        email: &str,
    ) -> Result<String, DomainError> {
        let code = reset.begin(users, email)?;
        self.ui
            .notifier
            .info(&format!("[SİMÜLASYON] Kodunuz: {code}"));
        info!("Password reset code issued");
        Ok(code)
    }

    #[instrument(name = "housekeeping.service.complete_password_reset", skip_all)]
    pub async fn complete_password_reset(
        &self,
        reset: &mut PasswordReset,
        users: &[User],
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<DocId, DomainError> {
        let user_id = reset.verify(code, new_password, confirm_password)?;

        {
            let _loading = self.loading("Şifre güncelleniyor...");
            self.repo.set_password(&user_id, new_password).await?;
        }
        reset.consume();

        let target = users.iter().find(|u| u.id == user_id);
        self.activity
            .log(target, ActivityAction::PasswordReset, Default::default())
            .await;
        self.events.publish(&HousekeepingEvent::PasswordReset {
            user_id: user_id.clone(),
        });
        self.ui.notifier.success("Şifre güncellendi.");
        info!(user_id = %user_id, "Password reset completed");
        Ok(user_id)
    }

    // --- bootstrap ---

    #[instrument(name = "housekeeping.service.seed_founder", skip(self, founder), fields(email = %founder.email))]
    pub async fn seed_founder(&self, founder: &FounderSeed) -> Result<DocId, DomainError> {
        let id = self.repo.add_user(&founder.record()).await?;
        self.events
            .publish(&HousekeepingEvent::FounderSeeded { id: id.clone() });
        info!(user_id = %id, "Founder account seeded");
        Ok(id)
    }

    #[instrument(name = "housekeeping.service.seed_default_items", skip(self))]
    pub async fn seed_default_items(&self) -> Result<usize, DomainError> {
        let count = self.repo.seed_items(&seed::default_item_records()).await?;
        self.events
            .publish(&HousekeepingEvent::DefaultItemsSeeded { count });
        info!(count, "Default checklist seeded");
        Ok(count)
    }

    // --- validation helpers ---

    fn validate_new_user(&self, form: NewUser) -> Result<UserRecord, DomainError> {
        let username = form.username.trim().to_string();
        let full_name = form.full_name.trim().to_string();
        let email = form.email.trim().to_string();
        let phone = form.phone.trim().to_string();

        if username.is_empty() {
            return Err(DomainError::validation("username", "Lütfen tüm alanları doldurun!"));
        }
        if full_name.is_empty() {
            return Err(DomainError::validation("full_name", "Lütfen tüm alanları doldurun!"));
        }
        if !EMAIL_RE.is_match(&email) {
            return Err(DomainError::validation("email", "Geçerli bir e-posta adresi girin!"));
        }
        if phone.chars().filter(char::is_ascii_digit).count() < self.config.min_phone_digits {
            return Err(DomainError::validation("phone", "Geçerli bir telefon numarası girin!"));
        }
        if form.password.chars().count() < self.config.min_password_len {
            return Err(DomainError::validation(
                "password",
                format!("Şifre en az {} karakter olmalıdır!", self.config.min_password_len),
            ));
        }
        if form.password != form.confirm_password {
            return Err(DomainError::validation("confirm_password", "Şifreler eşleşmiyor!"));
        }
        let role = authz::assignable_role(form.role.unwrap_or(Role::Staff))?;

        Ok(UserRecord {
            username,
            full_name,
            email,
            phone,
            dob: form.dob,
            password: form.password,
            role,
        })
    }
}

fn non_empty_or(value: String, fallback: impl FnOnce() -> String) -> String {
    if value.trim().is_empty() {
        fallback()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tracing_test::traced_test;

    use super::*;
    use crate::domain::records::decode_all;
    use crate::domain::store::{Collection, DocumentStore, Query};
    use crate::infra::events::BroadcastPublisher;
    use crate::infra::session::InMemorySessionStorage;
    use crate::infra::storage::InMemoryDocumentStore;
    use crate::infra::ui::{FixedConfirmer, TracingLoadingIndicator, TracingNotifier};

    fn create_test_service(store: Arc<InMemoryDocumentStore>) -> Service {
        let repo = HousekeepingRepo::new(store, Duration::from_secs(1));
        Service::new(
            repo,
            Arc::new(SessionStore::new(Arc::new(InMemorySessionStorage::default()))),
            UiPorts {
                notifier: Arc::new(TracingNotifier),
                loading: Arc::new(TracingLoadingIndicator),
                confirmer: Arc::new(FixedConfirmer(true)),
            },
            Arc::new(BroadcastPublisher::new(16)),
            ServiceConfig::default(),
        )
    }

    async fn roster(service: &Service, store: &InMemoryDocumentStore) -> Vec<User> {
        let founder = FounderSeed {
            username: "kurucu".into(),
            full_name: "Kurucu".into(),
            email: "kurucu@otel.com".into(),
            phone: String::new(),
            password: "kurucu1".into(),
        };
        service.seed_founder(&founder).await.unwrap();
        let docs = store.query(Collection::Users, Query::all()).await.unwrap();
        decode_all(&docs)
    }

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.into(),
            full_name: "Ali Kaya".into(),
            email: email.into(),
            phone: "0555 111 22 33".into(),
            dob: String::new(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            role: Some(Role::Staff),
        }
    }

    #[tokio::test]
    async fn login_requires_loaded_roster() {
        let service = create_test_service(Arc::new(InMemoryDocumentStore::new()));
        let err = service.login(&[], "a@b.co", "x").await.unwrap_err();
        assert!(matches!(err, DomainError::RosterNotLoaded));
    }

    #[tokio::test]
    #[traced_test]
    async fn login_is_traced_with_span() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = create_test_service(store.clone());
        let users = roster(&service, &store).await;

        service
            .login(&users, "Kurucu@Otel.com", "kurucu1")
            .await
            .unwrap();

        assert!(logs_contain("housekeeping.service.login"));
        assert!(logs_contain("Signed in"));
        assert_eq!(service.session().role(), Some(Role::Founder));
    }

    #[tokio::test]
    #[traced_test]
    async fn rejected_login_is_logged() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = create_test_service(store.clone());
        let users = roster(&service, &store).await;

        let err = service
            .login(&users, "kurucu@otel.com", "wrong")
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidCredentials));
        assert!(logs_contain("Login rejected"));
        assert_eq!(store.len(Collection::ActivityLogs), 1);
    }

    #[tokio::test]
    async fn add_user_validates_before_duplicates() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = create_test_service(store.clone());
        let users = roster(&service, &store).await;
        service.login(&users, "kurucu@otel.com", "kurucu1").await.unwrap();

        let mut bad = new_user("kurucu", "not-an-email");
        let err = service.add_user(&users, bad.clone()).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "email"));

        bad.email = "yeni@otel.com".into();
        let err = service.add_user(&users, bad).await.unwrap_err();
        assert!(matches!(err, DomainError::Duplicate { ref field, .. } if field == "username"));

        let err = service
            .add_user(&users, new_user("yeni", "kurucu@otel.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Duplicate { ref field, .. } if field == "email"));

        let mut short = new_user("yeni", "yeni@otel.com");
        short.phone = "555".into();
        let err = service.add_user(&users, short).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "phone"));

        assert_eq!(store.len(Collection::Users), 1);
        service
            .add_user(&users, new_user("yeni", "yeni@otel.com"))
            .await
            .unwrap();
        assert_eq!(store.len(Collection::Users), 2);
    }

    #[tokio::test]
    async fn founder_role_cannot_be_assigned() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let service = create_test_service(store.clone());
        let mut users = roster(&service, &store).await;
        users[0].role = Role::Admin;
        service.session().set(users[0].clone()).await;

        let mut form = new_user("yeni", "yeni@otel.com");
        form.role = Some(Role::Founder);
        let err = service.add_user(&users, form).await.unwrap_err();

        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "role"));
        assert_eq!(store.len(Collection::Users), 1);
    }
}
