//! Headless UI adapters: used when no interactive front-end is attached.

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{Confirmer, LoadingIndicator, Notifier, ToastKind};

/// Writes toasts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, kind: ToastKind, message: &str) {
        match kind {
            ToastKind::Success | ToastKind::Info => info!(toast = ?kind, "{message}"),
            ToastKind::Warning => warn!(toast = ?kind, "{message}"),
            ToastKind::Error => error!(toast = ?kind, "{message}"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLoadingIndicator;

impl LoadingIndicator for TracingLoadingIndicator {
    fn show(&self, message: &str) {
        debug!("Loading: {message}");
    }

    fn hide(&self) {
        debug!("Loading done");
    }
}

/// Answers every confirmation with a fixed value.
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmer(pub bool);

#[async_trait]
impl Confirmer for FixedConfirmer {
    async fn ask(&self, message: &str, title: &str) -> bool {
        debug!(title, answer = self.0, "Confirmation: {message}");
        self.0
    }
}
