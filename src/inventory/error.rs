use std::time::Duration;

use thiserror::Error;

use crate::kv::KvError;

/// Failure kinds of the inventory operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    /// A read or write against the backend failed.
    #[error("inventory backend unavailable: {0}")]
    BackendUnavailable(String),

    /// No item with this name exists.
    #[error("item not found: {0}")]
    NotFound(String),

    /// Every attempt lost the race against a concurrent writer.
    #[error("inventory was modified concurrently, gave up after {attempts} attempts")]
    Conflict { attempts: u32 },

    /// A backend call did not answer in time.
    #[error("inventory backend timed out after {0:?}")]
    Timeout(Duration),

    /// The item violates the data model.
    #[error("invalid item: {0}")]
    Invalid(String),

    /// The stored record is not an inventory.
    #[error("stored inventory is corrupt: {0}")]
    Corrupt(String),
}

impl InventoryError {
    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            InventoryError::BackendUnavailable(_) => "backend_unavailable",
            InventoryError::NotFound(_) => "not_found",
            InventoryError::Conflict { .. } => "conflict",
            InventoryError::Timeout(_) => "timeout",
            InventoryError::Invalid(_) => "invalid",
            InventoryError::Corrupt(_) => "corrupt",
        }
    }

    /// Whether retrying the whole operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            InventoryError::BackendUnavailable(_)
                | InventoryError::Conflict { .. }
                | InventoryError::Timeout(_)
        )
    }
}

impl From<KvError> for InventoryError {
    fn from(err: KvError) -> Self {
        match err {
            KvError::Malformed(msg) => InventoryError::Corrupt(msg),
            other => InventoryError::BackendUnavailable(other.to_string()),
        }
    }
}
