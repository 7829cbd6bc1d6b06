//! Orders - placing orders in the shop and billing them.
//!
//! The shop publishes each order once to topic `orders` on pub/sub
//! component `pubsub` ([`OrderPublisher`]); billing receives it either from
//! a bus subscription ([`subscribe`]) or over HTTP from a sidecar
//! (`router`, `http` feature) and logs the order total ([`BillingHandler`]).

mod billing;
#[cfg(feature = "http")]
mod http;
mod order;
mod publisher;
mod transport;

pub use billing::{BillingError, BillingHandler, Delivery, DEFAULT_DEDUP_CAPACITY};
pub use order::Order;
pub use publisher::OrderPublisher;
pub use transport::{subscribe, TransportHandle, TransportStats};

#[cfg(feature = "http")]
pub use http::{router, CloudEvent, Subscription, ORDERS_ROUTE};

/// Pub/sub component orders are published on.
pub const PUBSUB_NAME: &str = "pubsub";

/// Topic orders are published to.
pub const ORDERS_TOPIC: &str = "orders";

/// Event type of a placed order.
pub const ORDER_PLACED: &str = "order.placed";
