pub mod broadcast;

pub use broadcast::BroadcastPublisher;
