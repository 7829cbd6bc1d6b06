//! Shop front-end: the customer's cart and the warehouse client it lists sweets from.

mod cart;
#[cfg(feature = "http")]
mod warehouse_client;

pub use cart::{Cart, CartError, CustomerDetails};

#[cfg(feature = "http")]
pub use warehouse_client::{ClientError, WarehouseClient};
