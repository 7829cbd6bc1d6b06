//! Core subscriber traits for the message bus.

use super::publisher::{Event, PublishError};

/// Trait for subscribing to events from a message bus.
///
/// Pull-based: callers poll, then ack what they handled.
pub trait Subscriber: Send + Sync {
    /// Poll for the next event, blocking until one is available or timeout.
    fn poll(&self, timeout_ms: u64) -> Result<Option<Event>, PublishError>;

    /// Acknowledge that an event has been processed.
    fn ack(&self, event_id: &str) -> Result<(), PublishError>;
}

/// Trait for subscribers that can create independent subscriber instances.
pub trait Subscribable: Subscriber + Sized {
    /// Create a new independent subscriber to one topic of the same event source.
    ///
    /// The new subscriber has its own read position, so every subscriber
    /// sees every event of its topic.
    fn subscribe(&self, topic: &str) -> Self;
}
