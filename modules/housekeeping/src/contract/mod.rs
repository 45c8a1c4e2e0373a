pub mod client;
pub mod error;
pub mod model;

pub use client::HousekeepingClient;
pub use error::HousekeepingError;
pub use model::*;

// Events observed through the client are the domain events themselves.
pub use crate::domain::events::HousekeepingEvent;
