use std::time::Duration;

use sweetshop::inventory::{InventoryStore, Item, RetryPolicy, StoreConfig};
use sweetshop::kv::InMemoryKvStore;

pub const STORE: &str = "kvstore";
pub const KEY: &str = "inventory";

/// Short timeouts and no backoff so failure paths finish quickly.
pub fn fast_config() -> StoreConfig {
    StoreConfig {
        call_timeout: Duration::from_millis(500),
        retry: RetryPolicy {
            max_attempts: 5,
            backoff: Duration::ZERO,
        },
        ..StoreConfig::default()
    }
}

/// A store over a fresh in-memory backend. The backend is shared with the returned handle.
pub fn store() -> (InventoryStore<InMemoryKvStore>, InMemoryKvStore) {
    store_with(fast_config())
}

pub fn store_with(config: StoreConfig) -> (InventoryStore<InMemoryKvStore>, InMemoryKvStore) {
    let kv = InMemoryKvStore::new();
    (InventoryStore::with_config(kv.clone(), config), kv)
}

/// Decode what the backend currently holds for the inventory record.
pub fn persisted(kv: &InMemoryKvStore) -> Option<Vec<Item>> {
    kv.raw(STORE, KEY)
        .map(|bytes| serde_json::from_slice(&bytes).unwrap())
}

pub fn names(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}
