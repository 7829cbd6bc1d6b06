//! InMemoryKvStore - HashMap-backed key-value store for testing and development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use super::{ETag, KvError, KvStore, Precondition, Versioned};

/// Internal stored representation of a record.
struct StoredRecord {
    bytes: Vec<u8>,
    version: u64,
}

/// In-memory key-value store backed by a HashMap.
///
/// Storage key is `"store:key"`. Versions increase monotonically per record
/// and are exposed as decimal etags. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemoryKvStore {
    storage: Arc<RwLock<HashMap<String, StoredRecord>>>,
    faults: FaultInjector,
}

impl InMemoryKvStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn make_key(store: &str, key: &str) -> String {
        format!("{}:{}", store, key)
    }

    /// Fault injection controls shared by every clone of this store.
    pub fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Current version number of a record, if present.
    pub fn version(&self, store: &str, key: &str) -> Option<u64> {
        self.storage
            .read()
            .ok()?
            .get(&Self::make_key(store, key))
            .map(|s| s.version)
    }

    /// Raw bytes of a record, bypassing fault injection.
    pub fn raw(&self, store: &str, key: &str) -> Option<Vec<u8>> {
        self.storage
            .read()
            .ok()?
            .get(&Self::make_key(store, key))
            .map(|s| s.bytes.clone())
    }

    /// Number of successful writes since creation.
    pub fn writes(&self) -> u64 {
        self.faults.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, store: &str, key: &str) -> Result<Option<Versioned<Vec<u8>>>, KvError> {
        self.faults.before_read().await?;

        let storage = self
            .storage
            .read()
            .map_err(|_| KvError::Unavailable("lock poisoned".into()))?;

        Ok(storage
            .get(&Self::make_key(store, key))
            .map(|stored| Versioned {
                data: stored.bytes.clone(),
                etag: ETag::new(stored.version.to_string()),
            }))
    }

    async fn put(
        &self,
        store: &str,
        key: &str,
        value: Vec<u8>,
        precondition: Precondition,
    ) -> Result<ETag, KvError> {
        self.faults.before_write().await?;

        let storage_key = Self::make_key(store, key);
        let mut storage = self
            .storage
            .write()
            .map_err(|_| KvError::Unavailable("lock poisoned".into()))?;

        let actual = storage.get(&storage_key).map(|s| s.version);
        let holds = match (&precondition, actual) {
            (Precondition::Any, _) => true,
            (Precondition::Absent, current) => current.is_none(),
            (Precondition::Matches(etag), Some(current)) => etag.as_str() == current.to_string(),
            (Precondition::Matches(_), None) => false,
        };

        if !holds {
            return Err(KvError::Conflict {
                store: store.to_string(),
                key: key.to_string(),
                expected: precondition,
                actual: actual.map(|v| ETag::new(v.to_string())),
            });
        }

        let new_version = actual.map(|v| v + 1).unwrap_or(1);
        storage.insert(
            storage_key,
            StoredRecord {
                bytes: value,
                version: new_version,
            },
        );
        self.faults.writes.fetch_add(1, Ordering::SeqCst);

        Ok(ETag::new(new_version.to_string()))
    }
}

/// Error and latency injection for [`InMemoryKvStore`].
///
/// Counters are consumed one per call: `fail_reads(2)` makes the next two
/// reads fail with [`KvError::Unavailable`].
#[derive(Clone, Default)]
pub struct FaultInjector {
    failing_reads: Arc<AtomicUsize>,
    failing_writes: Arc<AtomicUsize>,
    latency: Arc<Mutex<Option<Duration>>>,
    writes: Arc<AtomicU64>,
}

impl FaultInjector {
    /// Fail the next `count` reads.
    pub fn fail_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    /// Fail the next `count` writes.
    pub fn fail_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Delay every call by `latency`; `None` removes the delay.
    pub fn set_latency(&self, latency: Option<Duration>) {
        if let Ok(mut current) = self.latency.lock() {
            *current = latency;
        }
    }

    async fn before_read(&self) -> Result<(), KvError> {
        self.delay().await;
        if take_one(&self.failing_reads) {
            return Err(KvError::Unavailable("injected read failure".into()));
        }
        Ok(())
    }

    async fn before_write(&self) -> Result<(), KvError> {
        self.delay().await;
        if take_one(&self.failing_writes) {
            return Err(KvError::Unavailable("injected write failure".into()));
        }
        Ok(())
    }

    async fn delay(&self) {
        let latency = self.latency.lock().ok().and_then(|l| *l);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}
