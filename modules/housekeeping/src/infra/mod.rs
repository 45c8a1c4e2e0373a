pub mod events;
pub mod session;
pub mod storage;
pub mod ui;
