//! In-memory queue for testing and single-process scenarios.
//!
//! Implements both `Publisher` and `Subscriber`:
//! - Thread-safe (shared across threads via `Clone`)
//! - Topic subscriptions via `subscribe(topic)`, each with its own position
//! - Events are stored in an append-only log

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use super::{Event, PublishError, Publisher, Subscribable, Subscriber};

/// Per-subscriber delivery state.
#[derive(Default)]
struct Cursor {
    position: usize,
    acked: Vec<String>,
}

/// In-memory pub/sub queue.
///
/// ## Example
///
/// ```
/// use sweetshop::bus::{Event, InMemoryQueue, Publisher, Subscribable, Subscriber};
///
/// let queue = InMemoryQueue::new();
/// let billing = queue.subscribe("orders");
///
/// queue.publish(Event::with_string_payload("evt-1", "orders", "order.placed", "{}")).unwrap();
/// queue.publish(Event::with_string_payload("evt-2", "audit", "login", "{}")).unwrap();
///
/// let event = billing.poll(10).unwrap().unwrap();
/// assert_eq!(event.id, "evt-1");
/// assert!(billing.poll(10).unwrap().is_none());
/// ```
#[derive(Clone)]
pub struct InMemoryQueue {
    /// Shared event log
    log: Arc<RwLock<Vec<Event>>>,
    /// Topic this subscriber reads; `None` reads every topic
    topic: Option<String>,
    /// Per-subscriber delivery state
    cursor: Arc<Mutex<Cursor>>,
    /// Shared publish failure injection
    failing_publishes: Arc<AtomicUsize>,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<T>(_: T) -> PublishError {
    PublishError::ConnectionFailed("queue lock poisoned".into())
}

impl InMemoryQueue {
    /// Create a new in-memory queue reading every topic.
    pub fn new() -> Self {
        Self {
            log: Arc::new(RwLock::new(Vec::new())),
            topic: None,
            cursor: Arc::new(Mutex::new(Cursor::default())),
            failing_publishes: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get all events in the log.
    pub fn events(&self) -> Vec<Event> {
        self.log.read().map(|log| log.clone()).unwrap_or_default()
    }

    /// Get all events published to a topic.
    pub fn events_on(&self, topic: &str) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.topic == topic)
            .collect()
    }

    /// Get the total number of events in the log.
    pub fn len(&self) -> usize {
        self.log.read().map(|log| log.len()).unwrap_or(0)
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get event IDs acknowledged by this subscriber.
    pub fn acknowledged(&self) -> Vec<String> {
        self.cursor
            .lock()
            .map(|c| c.acked.clone())
            .unwrap_or_default()
    }

    /// Make the next `count` publishes fail with `ConnectionFailed`.
    pub fn fail_publishes(&self, count: usize) {
        self.failing_publishes.store(count, Ordering::SeqCst);
    }

    fn take_failure(&self) -> bool {
        self.failing_publishes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn next_event(&self) -> Result<Option<Event>, PublishError> {
        let log = self.log.read().map_err(poisoned)?;
        let mut cursor = self.cursor.lock().map_err(poisoned)?;

        while cursor.position < log.len() {
            let event = &log[cursor.position];
            cursor.position += 1;
            if self.topic.as_deref().map_or(true, |t| t == event.topic) {
                return Ok(Some(event.clone()));
            }
        }

        Ok(None)
    }
}

impl Publisher for InMemoryQueue {
    fn publish(&self, event: Event) -> Result<(), PublishError> {
        if self.take_failure() {
            return Err(PublishError::ConnectionFailed("injected publish failure".into()));
        }
        self.log.write().map_err(poisoned)?.push(event);
        Ok(())
    }
}

impl Subscriber for InMemoryQueue {
    fn poll(&self, timeout_ms: u64) -> Result<Option<Event>, PublishError> {
        // No representable deadline means wait indefinitely.
        let deadline = Instant::now().checked_add(Duration::from_millis(timeout_ms));

        loop {
            if let Some(event) = self.next_event()? {
                return Ok(Some(event));
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                return Ok(None);
            }

            // Small sleep to avoid busy-waiting
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn ack(&self, event_id: &str) -> Result<(), PublishError> {
        let mut cursor = self.cursor.lock().map_err(poisoned)?;
        cursor.acked.push(event_id.to_string());
        Ok(())
    }
}

impl Subscribable for InMemoryQueue {
    fn subscribe(&self, topic: &str) -> Self {
        Self {
            log: Arc::clone(&self.log),
            topic: Some(topic.to_string()),
            cursor: Arc::new(Mutex::new(Cursor::default())),
            failing_publishes: Arc::clone(&self.failing_publishes),
        }
    }
}
