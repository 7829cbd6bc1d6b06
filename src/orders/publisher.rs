//! OrderPublisher - the shop's side of the order topic.

use tracing::{info, warn};
use uuid::Uuid;

use super::order::Order;
use super::{ORDERS_TOPIC, ORDER_PLACED, PUBSUB_NAME};
use crate::bus::{Event, PublishError, Publisher, PUBSUB_METADATA};

/// Publishes orders to the `orders` topic.
///
/// Fire-and-forget: one attempt per order, the answer is a plain success flag.
pub struct OrderPublisher<P> {
    publisher: P,
    pubsub: String,
    topic: String,
}

impl<P: Publisher> OrderPublisher<P> {
    /// Publish through `publisher` on component `pubsub`, topic `orders`.
    pub fn new(publisher: P) -> Self {
        Self {
            publisher,
            pubsub: PUBSUB_NAME.to_string(),
            topic: ORDERS_TOPIC.to_string(),
        }
    }

    /// Publish the order. Errors are logged and reported as `false`.
    pub fn publish_order(&self, order: &Order) -> bool {
        match self.try_publish(order) {
            Ok(id) => {
                info!(event_id = %id, customer = %order.name, topic = %self.topic, "order published");
                true
            }
            Err(err) => {
                warn!(customer = %order.name, topic = %self.topic, error = %err, "failed to publish order");
                false
            }
        }
    }

    /// Publish the order, returning the id of the published event.
    pub fn try_publish(&self, order: &Order) -> Result<String, PublishError> {
        let id = Uuid::new_v4().to_string();
        let event = Event::encode_as(
            self.publisher.payload_format(),
            id.clone(),
            self.topic.as_str(),
            ORDER_PLACED,
            order,
        )?
        .with_metadata(PUBSUB_METADATA, self.pubsub.as_str());
        self.publisher.publish(event)?;
        Ok(id)
    }

    /// Get a reference to the underlying publisher.
    pub fn publisher(&self) -> &P {
        &self.publisher
    }
}
