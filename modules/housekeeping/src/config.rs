use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::seed::FounderSeed;

/// Configuration for the housekeeping module (`modules.housekeeping`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HousekeepingConfig {
    /// Upper bound for every document store call
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,
    /// Live history view size (newest first)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Intent queue and event buffer capacity
    #[serde(default = "default_view_channel_capacity")]
    pub view_channel_capacity: usize,
    /// Persist the session to this file; in-memory when unset
    #[serde(default)]
    pub session_file: Option<PathBuf>,
    #[serde(default = "default_seed_default_items")]
    pub seed_default_items: bool,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Founder account created when the roster is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapConfig {
    #[serde(default = "default_founder_username")]
    pub username: String,
    #[serde(default = "default_founder_full_name")]
    pub full_name: String,
    #[serde(default = "default_founder_email")]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "default_founder_password")]
    pub password: String,
}

impl Default for HousekeepingConfig {
    fn default() -> Self {
        Self {
            remote_timeout_ms: default_remote_timeout_ms(),
            history_limit: default_history_limit(),
            view_channel_capacity: default_view_channel_capacity(),
            session_file: None,
            seed_default_items: default_seed_default_items(),
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            username: default_founder_username(),
            full_name: default_founder_full_name(),
            email: default_founder_email(),
            phone: String::new(),
            password: default_founder_password(),
        }
    }
}

impl HousekeepingConfig {
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}

impl BootstrapConfig {
    pub fn founder_seed(&self) -> FounderSeed {
        FounderSeed {
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            password: self.password.clone(),
        }
    }
}

fn default_remote_timeout_ms() -> u64 {
    10_000
}

fn default_history_limit() -> usize {
    20
}

fn default_view_channel_capacity() -> usize {
    64
}

fn default_seed_default_items() -> bool {
    true
}

fn default_founder_username() -> String {
    "kurucu".to_string()
}

fn default_founder_full_name() -> String {
    "Kurucu".to_string()
}

fn default_founder_email() -> String {
    "founder@roomcheck.local".to_string()
}

fn default_founder_password() -> String {
    "Kurucu_0001".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_section_uses_defaults() {
        let cfg: HousekeepingConfig = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(cfg.history_limit, 20);
        assert_eq!(cfg.remote_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.bootstrap.email, "founder@roomcheck.local");
        assert!(cfg.seed_default_items);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res: Result<HousekeepingConfig, _> =
            serde_json::from_value(serde_json::json!({ "histroy_limit": 5 }));
        assert!(res.is_err());
    }
}
