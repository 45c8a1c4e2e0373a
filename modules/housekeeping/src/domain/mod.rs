pub mod activity;
pub mod authz;
pub mod collation;
pub mod error;
pub mod events;
pub mod password_reset;
pub mod ports;
pub mod projection;
pub mod records;
pub mod repo;
pub mod seed;
pub mod service;
pub mod session;
pub mod store;
pub mod view_gate;
