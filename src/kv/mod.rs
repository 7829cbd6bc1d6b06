//! Key-value backends - versioned records addressed by `(store, key)`.
//!
//! Every read returns the record's current [`ETag`]; every write carries a
//! [`Precondition`] that the backend checks atomically before applying it.
//! This is the only primitive the inventory core needs to make its
//! read-modify-write cycle safe.
//!
//! ## Example
//!
//! ```ignore
//! use sweetshop::kv::{InMemoryKvStore, KvStore, Precondition};
//!
//! let kv = InMemoryKvStore::new();
//! let etag = kv.put("kvstore", "greeting", b"\"hi\"".to_vec(), Precondition::Absent).await?;
//! let record = kv.get("kvstore", "greeting").await?.unwrap();
//! assert_eq!(record.etag, etag);
//!
//! // A stale etag is rejected.
//! kv.put("kvstore", "greeting", b"\"bye\"".to_vec(), Precondition::Matches(etag.clone())).await?;
//! let err = kv.put("kvstore", "greeting", b"\"again\"".to_vec(), Precondition::Matches(etag)).await;
//! assert!(matches!(err, Err(KvError::Conflict { .. })));
//! ```

mod in_memory;
#[cfg(feature = "http")]
mod sidecar;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

pub use in_memory::{FaultInjector, InMemoryKvStore};
#[cfg(feature = "http")]
pub use sidecar::SidecarKvStore;

/// Opaque version token for a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ETag(String);

impl ETag {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A value paired with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub data: T,
    pub etag: ETag,
}

/// Condition a write must satisfy to be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Precondition {
    /// Unconditional write (last writer wins).
    Any,
    /// The key must not exist yet.
    Absent,
    /// The stored version must still be this one.
    Matches(ETag),
}

impl Precondition {
    /// Precondition that matches the state observed by a read.
    pub fn from_read<T>(read: Option<&Versioned<T>>) -> Self {
        match read {
            Some(versioned) => Precondition::Matches(versioned.etag.clone()),
            None => Precondition::Absent,
        }
    }
}

impl fmt::Display for Precondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precondition::Any => f.write_str("any"),
            Precondition::Absent => f.write_str("absent"),
            Precondition::Matches(etag) => write!(f, "etag {}", etag),
        }
    }
}

/// Error type for key-value backend operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KvError {
    /// The write's precondition no longer holds.
    #[error("conflict on {store}/{key} (expected {expected}, found {})", .actual.as_ref().map(ETag::as_str).unwrap_or("nothing"))]
    Conflict {
        store: String,
        key: String,
        expected: Precondition,
        actual: Option<ETag>,
    },

    /// The backend could not be reached or refused the request.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered with something that is not a record.
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

/// A remote key-value backend with conditional writes.
///
/// Implementations must apply the precondition check and the write as one
/// atomic step; callers rely on that for lost-update protection.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read a record. Returns `None` if the key does not exist.
    async fn get(&self, store: &str, key: &str) -> Result<Option<Versioned<Vec<u8>>>, KvError>;

    /// Write a record if `precondition` holds, returning the new version.
    async fn put(
        &self,
        store: &str,
        key: &str,
        value: Vec<u8>,
        precondition: Precondition,
    ) -> Result<ETag, KvError>;
}

#[async_trait]
impl<S: KvStore + ?Sized> KvStore for std::sync::Arc<S> {
    async fn get(&self, store: &str, key: &str) -> Result<Option<Versioned<Vec<u8>>>, KvError> {
        (**self).get(store, key).await
    }

    async fn put(
        &self,
        store: &str,
        key: &str,
        value: Vec<u8>,
        precondition: Precondition,
    ) -> Result<ETag, KvError> {
        (**self).put(store, key, value, precondition).await
    }
}
