//! First-run data: the founder account and the default room checklist.

use crate::contract::model::Role;
use crate::domain::records::{ItemRecord, UserRecord};

/// Default catalog, in its historical insertion order.
pub const DEFAULT_ROOM_ITEMS: [&str; 15] = [
    "Yatak Düzeni",
    "Çarşaf Değişimi",
    "Yastık Kılıfları",
    "Banyo Temizliği",
    "Havlu Değişimi",
    "Tuvalet Temizliği",
    "Zemin Temizliği",
    "Toz Alma",
    "Minibar Kontrolü",
    "Su Isıtıcı / Bardak",
    "Klima Kontrolü",
    "Televizyon",
    "Aydınlatma",
    "Oda Kokusu",
    "Çöp Kovası",
];

/// Credentials of the account created when the roster is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FounderSeed {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl FounderSeed {
    pub fn record(&self) -> UserRecord {
        UserRecord {
            username: self.username.clone(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            dob: String::new(),
            password: self.password.clone(),
            role: Role::Founder,
        }
    }
}

pub fn default_item_records() -> Vec<ItemRecord> {
    DEFAULT_ROOM_ITEMS
        .iter()
        .map(|name| ItemRecord {
            name: name.to_string(),
            description: String::new(),
        })
        .collect()
}
