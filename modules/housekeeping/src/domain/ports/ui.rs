use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Transient user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: ToastKind, message: &str);

    fn success(&self, message: &str) {
        self.notify(ToastKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(ToastKind::Error, message);
    }

    fn info(&self, message: &str) {
        self.notify(ToastKind::Info, message);
    }
}

/// Blocking "busy" overlay shown while a remote call is in flight.
pub trait LoadingIndicator: Send + Sync {
    fn show(&self, message: &str);
    fn hide(&self);
}

/// Shows the indicator on creation and hides it when dropped, so every exit
/// path (success, error, timeout, cancellation) releases it.
#[must_use = "the indicator is hidden as soon as the guard is dropped"]
pub struct LoadingGuard<'a> {
    indicator: &'a dyn LoadingIndicator,
}

impl<'a> LoadingGuard<'a> {
    pub fn show(indicator: &'a dyn LoadingIndicator, message: &str) -> Self {
        indicator.show(message);
        Self { indicator }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.indicator.hide();
    }
}

/// Interactive yes/no confirmation. Dismissing the prompt answers `false`.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn ask(&self, message: &str, title: &str) -> bool;
}

/// Default confirmation title.
pub const DEFAULT_CONFIRM_TITLE: &str = "Onay Gerekli";
