use std::time::Duration;

use sweetshop::inventory::{default_inventory, InventoryError, Item, StoreConfig};
use sweetshop::kv::{KvStore, Precondition};

use crate::support::{fast_config, persisted, store, store_with, KEY, STORE};

#[tokio::test]
async fn unavailable_backend_reads_as_empty() {
    let (store, kv) = store();
    kv.faults().fail_reads(1);

    assert!(store.fetch_inventory().await.is_empty());
    assert_eq!(store.fetch_inventory().await, default_inventory());
}

#[tokio::test]
async fn load_reports_the_failure_kind() {
    let (store, kv) = store();
    kv.faults().fail_reads(1);

    let err = store.load().await.unwrap_err();
    assert_eq!(err.kind(), "backend_unavailable");
    assert!(err.is_transient());
}

#[tokio::test]
async fn failed_write_leaves_inventory_unchanged() {
    let (store, kv) = store();
    let before = store.fetch_inventory().await;
    kv.faults().fail_writes(1);

    let result = store.upsert_item(Item::new("Marshmallow", 0.99, 50)).await;

    assert!(matches!(result, Err(InventoryError::BackendUnavailable(_))));
    assert!(result.is_err());
    assert_eq!(persisted(&kv), Some(before));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let (store, kv) = store_with(StoreConfig {
        call_timeout: Duration::from_millis(20),
        ..fast_config()
    });
    kv.faults().set_latency(Some(Duration::from_millis(200)));

    let err = store
        .upsert_item(Item::new("Marshmallow", 0.99, 50))
        .await
        .unwrap_err();
    assert_eq!(err, InventoryError::Timeout(Duration::from_millis(20)));
    assert!(store.fetch_inventory().await.is_empty());
}

#[tokio::test]
async fn corrupt_record_is_reported_not_overwritten() {
    let (store, kv) = store();
    kv.put(STORE, KEY, b"{\"not\":\"a list\"}".to_vec(), Precondition::Absent)
        .await
        .unwrap();

    assert!(matches!(store.load().await, Err(InventoryError::Corrupt(_))));
    assert!(matches!(
        store.upsert_item(Item::new("Fudge", 2.0, 1)).await,
        Err(InventoryError::Corrupt(_))
    ));
    assert_eq!(kv.writes(), 1);
}

#[tokio::test]
async fn record_with_repeated_names_is_corrupt() {
    let (store, kv) = store();
    let record = br#"[{"name":"A","price":1.0,"quantity":1},{"name":"A","price":2.0,"quantity":2}]"#;
    kv.put(STORE, KEY, record.to_vec(), Precondition::Absent)
        .await
        .unwrap();

    assert!(matches!(store.load().await, Err(InventoryError::Corrupt(_))));
    assert!(matches!(
        store.adjust_quantity("A", 5).await,
        Err(InventoryError::Corrupt(_))
    ));
    assert!(matches!(
        store.upsert_item(Item::new("Fudge", 2.0, 1)).await,
        Err(InventoryError::Corrupt(_))
    ));
    assert!(store.fetch_inventory().await.is_empty());
    assert_eq!(kv.writes(), 1);
    assert_eq!(kv.raw(STORE, KEY), Some(record.to_vec()));
}
