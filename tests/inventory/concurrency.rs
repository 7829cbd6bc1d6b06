use std::sync::Arc;
use std::time::Duration;

use sweetshop::inventory::{find, InventoryStore, Item, RetryPolicy, StoreConfig};

use crate::support::{fast_config, names, store, store_with};

#[tokio::test]
async fn concurrent_upserts_from_same_base_both_land() {
    let (store, kv) = store();
    store.fetch_inventory().await;
    let writes = kv.writes();

    // Both reads complete before either write is applied.
    kv.faults().set_latency(Some(Duration::from_millis(20)));
    let (a, b) = tokio::join!(
        store.upsert_item(Item::new("Marshmallow", 0.99, 50)),
        store.upsert_item(Item::new("Toffee", 0.75, 30)),
    );
    kv.faults().set_latency(None);

    a.unwrap();
    b.unwrap();

    let items = store.fetch_inventory().await;
    assert_eq!(items.len(), 5);
    assert!(find(&items, "Marshmallow").is_some());
    assert!(find(&items, "Toffee").is_some());
    assert_eq!(kv.writes(), writes + 2);
}

#[tokio::test]
async fn concurrent_adjust_and_upsert_do_not_lose_updates() {
    let (store, kv) = store();
    store.fetch_inventory().await;

    kv.faults().set_latency(Some(Duration::from_millis(10)));
    let (adjusted, upserted) = tokio::join!(
        store.adjust_quantity("Chocolate", 1),
        store.upsert_item(Item::new("Fudge", 2.0, 5)),
    );
    kv.faults().set_latency(None);

    adjusted.unwrap();
    upserted.unwrap();

    let items = store.fetch_inventory().await;
    assert_eq!(find(&items, "Chocolate").map(|i| i.quantity), Some(1));
    assert_eq!(find(&items, "Fudge").map(|i| i.quantity), Some(5));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_writers_on_shared_store() {
    let (store, kv) = store_with(StoreConfig {
        retry: RetryPolicy {
            max_attempts: 32,
            backoff: Duration::from_millis(1),
        },
        ..fast_config()
    });
    let store = Arc::new(store);
    store.fetch_inventory().await;
    kv.faults().set_latency(Some(Duration::from_millis(2)));

    let tasks: Vec<_> = (0..8)
        .map(|n| {
            let store: Arc<InventoryStore<_>> = Arc::clone(&store);
            tokio::spawn(async move {
                store
                    .upsert_item(Item::new(format!("Sweet {n}"), 1.0, n))
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }
    kv.faults().set_latency(None);

    let items = store.fetch_inventory().await;
    assert_eq!(items.len(), 11);
    for n in 0..8 {
        assert!(names(&items).contains(&format!("Sweet {n}").as_str()));
    }
}
