//! Items and the in-memory transforms applied between read and write.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::error::InventoryError;

/// A named, priced, quantified inventory entry. Unique by `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub price: f64,
    pub quantity: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, price: f64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Check the data-model constraints: non-blank name, finite non-negative price.
    pub fn validate(&self) -> Result<(), InventoryError> {
        if self.name.trim().is_empty() {
            return Err(InventoryError::Invalid("item name must not be empty".into()));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(InventoryError::Invalid(format!(
                "price of {} must be a non-negative number, got {}",
                self.name, self.price
            )));
        }
        Ok(())
    }
}

/// The inventory observed when the record is missing or empty.
pub fn default_inventory() -> Vec<Item> {
    vec![
        Item::new("Chocolate", 1.5, 100),
        Item::new("Lollypop", 0.5, 200),
        Item::new("Gummi", 1.0, 150),
    ]
}

/// Find an item by name.
pub fn find<'a>(items: &'a [Item], name: &str) -> Option<&'a Item> {
    items.iter().find(|i| i.name == name)
}

/// First name that appears more than once, if any.
pub fn duplicate_name(items: &[Item]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .map(|i| i.name.as_str())
        .find(|name| !seen.insert(*name))
}

/// Replace the item with the same name in place, or append it.
///
/// Returns `true` if an existing item was replaced.
pub fn upsert(items: &mut Vec<Item>, item: Item) -> bool {
    match items.iter_mut().find(|i| i.name == item.name) {
        Some(existing) => {
            *existing = item;
            true
        }
        None => {
            items.push(item);
            false
        }
    }
}

/// Set the quantity of the named item, leaving name and price untouched.
///
/// Returns the updated item, or `None` if no item has that name.
pub fn set_quantity(items: &mut [Item], name: &str, quantity: u32) -> Option<Item> {
    let item = items.iter_mut().find(|i| i.name == name)?;
    item.quantity = quantity;
    Some(item.clone())
}
