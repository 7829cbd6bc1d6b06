//! BillingHandler - the billing service's order subscription handler.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use thiserror::Error;
use tracing::{debug, info};

use super::order::Order;
use super::ORDER_PLACED;
use crate::bus::Event;

/// Error type for order events billing cannot process.
#[derive(Debug, Error)]
pub enum BillingError {
    /// The payload is not an order.
    #[error("cannot decode order event {id}: {reason}")]
    Decode { id: String, reason: String },
    /// The event is not an order placement.
    #[error("unexpected event type {event_type} on event {id}")]
    UnexpectedType { id: String, event_type: String },
}

/// What happened to a received order.
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// First time this order was seen; it was billed.
    Processed(Order),
    /// The event was already processed; nothing was done.
    Duplicate(Order),
}

impl Delivery {
    pub fn into_order(self) -> Order {
        match self {
            Delivery::Processed(order) | Delivery::Duplicate(order) => order,
        }
    }
}

/// Number of recent event ids remembered for deduplication.
pub const DEFAULT_DEDUP_CAPACITY: usize = 10_000;

/// The last `capacity` event ids, oldest evicted first.
struct RecentIds {
    order: VecDeque<String>,
    seen: HashSet<String>,
    capacity: usize,
}

impl RecentIds {
    fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            seen: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// Remember `id`. Returns `false` if it is still remembered from before.
    fn insert(&mut self, id: &str) -> bool {
        if self.seen.contains(id) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        self.order.push_back(id.to_string());
        self.seen.insert(id.to_string());
        true
    }
}

/// Receives placed orders and bills them.
///
/// Billing currently means logging the customer and the order total.
/// Recent event ids are remembered so a redelivered event is billed once;
/// an id older than the last `capacity` deliveries is forgotten.
pub struct BillingHandler {
    processed: Mutex<RecentIds>,
}

impl Default for BillingHandler {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DEDUP_CAPACITY)
    }
}

impl BillingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember at most `capacity` event ids (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            processed: Mutex::new(RecentIds::new(capacity)),
        }
    }

    /// Bill an order and hand it back.
    pub fn on_order(&self, order: Order) -> Order {
        info!(customer = %order.name, total = order.total(), items = order.sweets.len(), "processing order");
        order
    }

    /// Bill an order once per event id. Orders without an id are always billed.
    pub fn receive(&self, event_id: Option<&str>, order: Order) -> Delivery {
        if let Some(id) = event_id {
            let first_time = match self.processed.lock() {
                Ok(mut recent) => recent.insert(id),
                // Dedup state lost; billing again beats dropping the order.
                Err(_) => true,
            };
            if !first_time {
                debug!(event_id = id, "order already processed, skipping");
                return Delivery::Duplicate(order);
            }
        }
        Delivery::Processed(self.on_order(order))
    }

    /// Decode a bus event and bill the order it carries.
    pub fn handle_event(&self, event: &Event) -> Result<Delivery, BillingError> {
        if event.event_type != ORDER_PLACED {
            return Err(BillingError::UnexpectedType {
                id: event.id.clone(),
                event_type: event.event_type.clone(),
            });
        }
        let order: Order = event.decode().map_err(|e| BillingError::Decode {
            id: event.id.clone(),
            reason: e.to_string(),
        })?;
        Ok(self.receive(Some(&event.id), order))
    }

    /// Number of event ids currently remembered.
    pub fn processed_count(&self) -> usize {
        self.processed.lock().map(|r| r.order.len()).unwrap_or(0)
    }
}
