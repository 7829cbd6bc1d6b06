//! Message bus - topic-based publish/subscribe abstractions
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐  publish(topic)  ┌───────────────┐    poll/ack    ┌───────────────┐
//! │ OrderPublisher │ ───────────────▶ │  Publisher +  │ ─────────────▶ │    billing    │
//! │     (shop)     │                  │  Subscriber   │                │  subscribe()  │
//! └────────────────┘                  └───────────────┘                └───────────────┘
//!                                             │
//!                                             ▼
//!                               InMemoryQueue (in process), or
//!                               SidecarPublisher (broker behind a sidecar)
//! ```
//!
//! Delivery is best-effort: the publisher gets one success/failure answer
//! and nothing is retried on its behalf.

mod in_memory_queue;
mod publisher;
#[cfg(feature = "http")]
mod sidecar;
mod subscriber;

pub use in_memory_queue::InMemoryQueue;
pub use publisher::{Event, PayloadFormat, PublishError, Publisher, CONTENT_TYPE, PUBSUB_METADATA};
#[cfg(feature = "http")]
pub use sidecar::SidecarPublisher;
pub use subscriber::{Subscribable, Subscriber};
