//! InventoryStore - optimistic read-modify-write over the single inventory record.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::error::InventoryError;
use super::item::{self, Item};
use crate::kv::{ETag, KvError, KvStore, Precondition};

/// Name of the state store holding the inventory record.
pub const DEFAULT_STORE_NAME: &str = "kvstore";

/// Key of the inventory record.
pub const DEFAULT_INVENTORY_KEY: &str = "inventory";

/// How often a read-modify-write cycle is retried after losing a race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first one included. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay after the n-th conflict is `backoff * n`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            backoff: Duration::from_millis(10),
        }
    }
}

impl RetryPolicy {
    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    fn delay(&self, attempt: u32) -> Duration {
        self.backoff * attempt
    }
}

/// Configuration for [`InventoryStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub store_name: String,
    pub key: String,
    /// Upper bound for every single backend call.
    pub call_timeout: Duration,
    pub retry: RetryPolicy,
    /// Write the default inventory back when a read finds the record missing or empty.
    pub persist_seed: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_name: DEFAULT_STORE_NAME.to_string(),
            key: DEFAULT_INVENTORY_KEY.to_string(),
            call_timeout: Duration::from_secs(2),
            retry: RetryPolicy::default(),
            persist_seed: true,
        }
    }
}

/// Result of a successful upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Replaced,
}

/// The collection as read, plus the precondition a write based on it must carry.
struct Snapshot {
    items: Vec<Item>,
    base: Precondition,
    seeded: bool,
}

enum WriteOutcome {
    Stored(ETag),
    Stale,
}

/// Inventory client over a versioned key-value backend.
///
/// The whole inventory lives in one record. Mutations read it, transform it
/// in memory and write it back conditionally on the version they read; a
/// concurrent writer makes the write fail and the cycle is retried per the
/// [`RetryPolicy`].
///
/// ## Example
///
/// ```ignore
/// use sweetshop::inventory::{InventoryStore, Item};
/// use sweetshop::kv::InMemoryKvStore;
///
/// let store = InventoryStore::new(InMemoryKvStore::new());
/// assert_eq!(store.fetch_inventory().await.len(), 3);
///
/// store.upsert_item(Item::new("Marshmallow", 0.99, 50)).await?;
/// store.adjust_quantity("Marshmallow", 10).await?;
/// ```
pub struct InventoryStore<S> {
    kv: S,
    config: StoreConfig,
}

impl<S: KvStore> InventoryStore<S> {
    /// Create a store with the default configuration.
    pub fn new(kv: S) -> Self {
        Self::with_config(kv, StoreConfig::default())
    }

    pub fn with_config(kv: S, config: StoreConfig) -> Self {
        Self { kv, config }
    }

    /// Get a reference to the backend.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Read the inventory, never failing.
    ///
    /// Backend failures are logged and reported as an empty inventory.
    pub async fn fetch_inventory(&self) -> Vec<Item> {
        match self.load().await {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    store = %self.config.store_name,
                    key = %self.config.key,
                    kind = err.kind(),
                    error = %err,
                    "failed to load inventory"
                );
                Vec::new()
            }
        }
    }

    /// Read the inventory, seeding it with the defaults if it is missing or empty.
    pub async fn load(&self) -> Result<Vec<Item>, InventoryError> {
        let attempts = self.config.retry.attempts();

        for attempt in 1..=attempts {
            let snapshot = self.read().await?;
            if !snapshot.seeded || !self.config.persist_seed {
                return Ok(snapshot.items);
            }

            match self.write(&snapshot.items, snapshot.base).await {
                Ok(WriteOutcome::Stored(etag)) => {
                    info!(key = %self.config.key, %etag, "seeded default inventory");
                    return Ok(snapshot.items);
                }
                Ok(WriteOutcome::Stale) => {
                    debug!(key = %self.config.key, attempt, "inventory written while seeding, re-reading");
                }
                Err(err) => {
                    // Readers still see the defaults; the next read tries again.
                    warn!(key = %self.config.key, error = %err, "failed to persist default inventory");
                    return Ok(snapshot.items);
                }
            }
        }

        Err(InventoryError::Conflict { attempts })
    }

    /// Insert the item, or replace the item with the same name entirely.
    pub async fn upsert_item(&self, item: Item) -> Result<Upserted, InventoryError> {
        item.validate()?;

        self.modify("upsert", |items| {
            Ok(if item::upsert(items, item.clone()) {
                Upserted::Replaced
            } else {
                Upserted::Inserted
            })
        })
        .await
    }

    /// Set the quantity of an existing item. Name and price stay untouched.
    ///
    /// Fails with [`InventoryError::NotFound`] without writing if no item has that name.
    pub async fn adjust_quantity(&self, name: &str, quantity: u32) -> Result<Item, InventoryError> {
        self.modify("adjust_quantity", |items| {
            item::set_quantity(items, name, quantity)
                .ok_or_else(|| InventoryError::NotFound(name.to_string()))
        })
        .await
    }

    /// Run one guarded read-modify-write cycle, retried on conflict.
    async fn modify<T, F>(&self, operation: &'static str, mut apply: F) -> Result<T, InventoryError>
    where
        F: FnMut(&mut Vec<Item>) -> Result<T, InventoryError> + Send,
        T: Send,
    {
        let attempts = self.config.retry.attempts();

        for attempt in 1..=attempts {
            let Snapshot {
                mut items, base, ..
            } = self.read().await?;

            let outcome = match apply(&mut items) {
                Ok(outcome) => outcome,
                Err(err) => {
                    debug!(operation, error = %err, "inventory operation rejected");
                    return Err(err);
                }
            };

            match self.write(&items, base).await? {
                WriteOutcome::Stored(etag) => {
                    debug!(operation, attempt, %etag, "inventory written");
                    return Ok(outcome);
                }
                WriteOutcome::Stale => {
                    debug!(operation, attempt, "inventory changed since read, retrying");
                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry.delay(attempt)).await;
                    }
                }
            }
        }

        warn!(operation, attempts, "giving up on inventory update after repeated conflicts");
        Err(InventoryError::Conflict { attempts })
    }

    async fn read(&self) -> Result<Snapshot, InventoryError> {
        let record = self
            .timed(self.kv.get(&self.config.store_name, &self.config.key))
            .await??;

        let base = Precondition::from_read(record.as_ref());
        let stored: Option<Vec<Item>> = match &record {
            Some(record) => serde_json::from_slice(&record.data)
                .map_err(|e| InventoryError::Corrupt(e.to_string()))?,
            None => None,
        };
        if let Some(name) = stored.as_deref().and_then(item::duplicate_name) {
            return Err(InventoryError::Corrupt(format!("item {name} is stored twice")));
        }

        Ok(match stored {
            Some(items) if !items.is_empty() => Snapshot {
                items,
                base,
                seeded: false,
            },
            _ => Snapshot {
                items: item::default_inventory(),
                base,
                seeded: true,
            },
        })
    }

    async fn write(&self, items: &[Item], base: Precondition) -> Result<WriteOutcome, InventoryError> {
        let bytes =
            serde_json::to_vec(items).map_err(|e| InventoryError::Invalid(e.to_string()))?;

        match self
            .timed(
                self.kv
                    .put(&self.config.store_name, &self.config.key, bytes, base),
            )
            .await?
        {
            Ok(etag) => Ok(WriteOutcome::Stored(etag)),
            Err(KvError::Conflict { .. }) => Ok(WriteOutcome::Stale),
            Err(err) => Err(err.into()),
        }
    }

    async fn timed<T, F>(&self, call: F) -> Result<Result<T, KvError>, InventoryError>
    where
        F: Future<Output = Result<T, KvError>>,
    {
        tokio::time::timeout(self.config.call_timeout, call)
            .await
            .map_err(|_| InventoryError::Timeout(self.config.call_timeout))
    }
}
