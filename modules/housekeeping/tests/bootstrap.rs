mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use housekeeping::config::HousekeepingConfig;
use housekeeping::contract::{HousekeepingError, Intent, IntentOutcome, Role};
use housekeeping::domain::store::Collection;

use common::{add_user, wait_until, CountingStore, Harness};

const SORTED_DEFAULTS: [&str; 15] = [
    "Aydınlatma",
    "Banyo Temizliği",
    "Çarşaf Değişimi",
    "Çöp Kovası",
    "Havlu Değişimi",
    "Klima Kontrolü",
    "Minibar Kontrolü",
    "Oda Kokusu",
    "Su Isıtıcı / Bardak",
    "Televizyon",
    "Toz Alma",
    "Tuvalet Temizliği",
    "Yastık Kılıfları",
    "Yatak Düzeni",
    "Zemin Temizliği",
];

#[tokio::test]
async fn test_empty_store_seeds_founder_and_default_items() -> Result<()> {
    let store = Arc::new(CountingStore::default());
    let h = Harness::start(store.clone()).await?;

    wait_until(|| {
        store.inner.len(Collection::Users) == 1 && store.inner.len(Collection::Items) == 15
    })
    .await?;

    let cfg = HousekeepingConfig::default();
    let outcome = h
        .dispatch(Intent::Login {
            email: cfg.bootstrap.email.to_uppercase(),
            password: cfg.bootstrap.password.clone(),
        })
        .await?;
    let IntentOutcome::SignedIn(user) = outcome else {
        anyhow::bail!("expected sign-in, got {outcome:?}");
    };
    assert_eq!(user.role, Role::Founder);

    let view = h.wait_view(|v| v.checklist.len() == 15).await?;
    let names: Vec<&str> = view.checklist.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, SORTED_DEFAULTS);
    assert_eq!(view.progress.total, 15);
    assert_eq!(view.progress.done, 0);
    assert!(view.affordances.founder_inbox);
    Ok(())
}

#[tokio::test]
async fn test_seeding_happens_once() -> Result<()> {
    let store = Arc::new(CountingStore::default());
    let _h = Harness::start(store.clone()).await?;

    wait_until(|| store.inner.len(Collection::Items) == 15).await?;
    // Let any further snapshots drain before counting again.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(store.inner.len(Collection::Users), 1);
    assert_eq!(store.inner.len(Collection::Items), 15);
    Ok(())
}

#[tokio::test]
async fn test_existing_roster_is_not_reseeded() -> Result<()> {
    let store = Arc::new(CountingStore::default());
    add_user(&store, "ayse", "ayse@otel.com", "staff11", Role::Staff).await?;

    let h = Harness::start(store.clone()).await?;
    h.wait_ready().await?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(store.inner.len(Collection::Users), 1);
    let cfg = HousekeepingConfig::default();
    let err = h
        .dispatch(Intent::Login {
            email: cfg.bootstrap.email,
            password: cfg.bootstrap.password,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, HousekeepingError::Unauthenticated { .. }));
    Ok(())
}

#[tokio::test]
async fn test_item_seeding_can_be_disabled() -> Result<()> {
    let store = Arc::new(CountingStore::default());
    let cfg = HousekeepingConfig {
        seed_default_items: false,
        ..Default::default()
    };
    let _h = Harness::start_with(store.clone(), cfg, None).await?;

    wait_until(|| store.inner.len(Collection::Users) == 1).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(store.inner.len(Collection::Items), 0);
    Ok(())
}
