pub mod session;
pub mod ui;

pub use session::SessionStorage;
pub use ui::{Confirmer, LoadingGuard, LoadingIndicator, Notifier, ToastKind};

/// Output port: publish domain events (no knowledge of transport).
pub trait EventPublisher<E>: Send + Sync + 'static {
    fn publish(&self, event: &E);
}
