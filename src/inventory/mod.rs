//! Inventory - the warehouse's stock, kept as one versioned record.
//!
//! The record holds a JSON array of [`Item`]s, unique by name. Reads seed
//! the defaults when the record is missing or empty; writes replace the
//! whole array and are conditional on the version that was read, so two
//! concurrent updates can never silently overwrite each other.
//!
//! ## Operations
//!
//! - [`InventoryStore::fetch_inventory`]: read, failures reported as empty
//! - [`InventoryStore::load`]: read with typed errors
//! - [`InventoryStore::upsert_item`]: insert or replace by name
//! - [`InventoryStore::adjust_quantity`]: set one item's quantity

mod error;
#[cfg(feature = "http")]
mod http;
mod item;
mod store;

pub use error::InventoryError;
pub use item::{default_inventory, find, Item};
pub use store::{
    InventoryStore, RetryPolicy, StoreConfig, Upserted, DEFAULT_INVENTORY_KEY, DEFAULT_STORE_NAME,
};

#[cfg(feature = "http")]
pub use http::router;
