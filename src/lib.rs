pub mod bus;
pub mod config;
pub mod inventory;
pub mod kv;
pub mod orders;
pub mod shop;
pub mod telemetry;

pub use inventory::{InventoryError, InventoryStore, Item, StoreConfig};
pub use kv::{InMemoryKvStore, KvError, KvStore};
pub use orders::{BillingHandler, Order, OrderPublisher};

#[cfg(feature = "http")]
pub use kv::SidecarKvStore;
