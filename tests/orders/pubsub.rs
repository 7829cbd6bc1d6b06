use std::sync::Arc;
use std::time::Duration;

use sweetshop::bus::{Event, InMemoryQueue, Publisher, Subscribable};
use sweetshop::orders::{self, BillingHandler, OrderPublisher, ORDERS_TOPIC, ORDER_PLACED};

use crate::support::{order, wait_until};

#[test]
fn published_order_is_billed() {
    let queue = InMemoryQueue::new();
    let handler = Arc::new(BillingHandler::new());
    let handle = orders::subscribe(
        handler.clone(),
        queue.subscribe(ORDERS_TOPIC),
        Duration::from_millis(10),
    );

    assert!(OrderPublisher::new(queue.clone()).publish_order(&order()));
    wait_until(|| handler.processed_count() == 1);

    let stats = handle.stop();
    assert_eq!(stats.handled, 1);
    assert_eq!(stats.failed, 0);
}

#[test]
fn redelivered_order_is_billed_once() {
    let queue = InMemoryQueue::new();
    let subscriber = queue.subscribe(ORDERS_TOPIC);
    let handler = Arc::new(BillingHandler::new());

    let event = Event::encode("evt-1", ORDERS_TOPIC, ORDER_PLACED, &order()).unwrap();
    queue.publish(event.clone()).unwrap();
    queue.publish(event).unwrap();

    let handle = orders::subscribe(handler.clone(), subscriber.clone(), Duration::from_millis(10));
    wait_until(|| subscriber.acknowledged().len() == 2);

    let stats = handle.stop();
    assert_eq!(stats.handled, 1);
    assert_eq!(stats.duplicates, 1);
    assert_eq!(handler.processed_count(), 1);
}

#[test]
fn undecodable_events_are_dropped() {
    let queue = InMemoryQueue::new();
    let subscriber = queue.subscribe(ORDERS_TOPIC);
    let handler = Arc::new(BillingHandler::new());

    queue
        .publish(Event::with_string_payload("bad", ORDERS_TOPIC, ORDER_PLACED, "not an order"))
        .unwrap();
    assert!(OrderPublisher::new(queue.clone()).publish_order(&order()));

    let handle = orders::subscribe(handler.clone(), subscriber.clone(), Duration::from_millis(10));
    wait_until(|| subscriber.acknowledged().len() == 2);

    let stats = handle.stop();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.handled, 1);
    assert_eq!(subscriber.acknowledged()[0], "bad");
}

#[test]
fn other_topics_are_not_delivered() {
    let queue = InMemoryQueue::new();
    let subscriber = queue.subscribe(ORDERS_TOPIC);
    let handler = Arc::new(BillingHandler::new());

    queue
        .publish(Event::encode("evt-1", "returns", ORDER_PLACED, &order()).unwrap())
        .unwrap();
    assert!(OrderPublisher::new(queue.clone()).publish_order(&order()));

    let handle = orders::subscribe(handler.clone(), subscriber.clone(), Duration::from_millis(10));
    wait_until(|| handler.processed_count() == 1);

    let stats = handle.stop();
    assert_eq!(stats.handled, 1);
    assert_eq!(subscriber.acknowledged().len(), 1);
}
