use serde::{Deserialize, Serialize};

use crate::inventory::Item;

/// An order placed in the shop and billed by the billing service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    #[serde(rename = "paymentMethod")]
    pub payment_method: String,
    pub sweets: Vec<Item>,
}

impl Order {
    /// Sum of price × quantity over the ordered sweets.
    pub fn total(&self) -> f64 {
        self.sweets
            .iter()
            .map(|s| s.price * f64::from(s.quantity))
            .sum()
    }
}
