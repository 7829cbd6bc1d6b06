//! Core publisher types for the message bus.

use thiserror::Error;

/// Metadata key carrying the payload's content type.
pub const CONTENT_TYPE: &str = "content-type";

/// Metadata key naming the pub/sub component an event is published on.
pub const PUBSUB_METADATA: &str = "pubsub";

/// How an event payload is serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PayloadFormat {
    /// bitcode, for in-process transports
    #[default]
    Binary,
    /// JSON, for transports that cross an HTTP boundary
    Json,
}

impl PayloadFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            PayloadFormat::Binary => "application/octet-stream",
            PayloadFormat::Json => "application/json",
        }
    }
}

/// A message published to a topic.
#[derive(Clone, Debug, PartialEq)]
pub struct Event {
    /// Unique identifier for this event
    pub id: String,
    /// Topic the event is published to (e.g., "orders")
    pub topic: String,
    /// Event type (e.g., "order.placed")
    pub event_type: String,
    /// Serialized payload
    pub payload: Vec<u8>,
    /// Optional metadata (pub/sub component, content type, ...)
    pub metadata: Option<Vec<(String, String)>>,
}

impl Event {
    /// Create a new event with the given topic, type and payload.
    pub fn new(
        id: impl Into<String>,
        topic: impl Into<String>,
        event_type: impl Into<String>,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            id: id.into(),
            topic: topic.into(),
            event_type: event_type.into(),
            payload,
            metadata: None,
        }
    }

    /// Create an event with a bitcode-serialized payload.
    pub fn encode<T: serde::Serialize>(
        id: impl Into<String>,
        topic: impl Into<String>,
        event_type: impl Into<String>,
        payload: &T,
    ) -> Result<Self, PublishError> {
        Self::encode_as(PayloadFormat::Binary, id, topic, event_type, payload)
    }

    /// Create an event with a payload serialized in `format`.
    ///
    /// JSON payloads are tagged with a `content-type` metadata entry.
    pub fn encode_as<T: serde::Serialize>(
        format: PayloadFormat,
        id: impl Into<String>,
        topic: impl Into<String>,
        event_type: impl Into<String>,
        payload: &T,
    ) -> Result<Self, PublishError> {
        match format {
            PayloadFormat::Binary => {
                let bytes = bitcode::serialize(payload)
                    .map_err(|e| PublishError::SerializationFailed(e.to_string()))?;
                Ok(Self::new(id, topic, event_type, bytes))
            }
            PayloadFormat::Json => {
                let bytes = serde_json::to_vec(payload)
                    .map_err(|e| PublishError::SerializationFailed(e.to_string()))?;
                Ok(Self::new(id, topic, event_type, bytes)
                    .with_metadata(CONTENT_TYPE, format.content_type()))
            }
        }
    }

    /// Format of the payload, from the `content-type` metadata. Untagged payloads are binary.
    pub fn format(&self) -> PayloadFormat {
        match self.metadata_value(CONTENT_TYPE) {
            Some(ct) if ct == PayloadFormat::Json.content_type() => PayloadFormat::Json,
            _ => PayloadFormat::Binary,
        }
    }

    /// Decode the payload according to its format.
    pub fn decode<T: serde::de::DeserializeOwned>(&self) -> Result<T, PublishError> {
        match self.format() {
            PayloadFormat::Binary => bitcode::deserialize(&self.payload)
                .map_err(|e| PublishError::SerializationFailed(e.to_string())),
            PayloadFormat::Json => serde_json::from_slice(&self.payload)
                .map_err(|e| PublishError::SerializationFailed(e.to_string())),
        }
    }

    /// Create an event with a string payload.
    pub fn with_string_payload(
        id: impl Into<String>,
        topic: impl Into<String>,
        event_type: impl Into<String>,
        payload: impl Into<String>,
    ) -> Self {
        Self::new(id, topic, event_type, payload.into().into_bytes())
    }

    /// Add metadata to the event.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata
            .get_or_insert_with(Vec::new)
            .push((key.into(), value.into()));
        self
    }

    /// Look up a metadata value by key.
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Error type for publish and subscribe operations.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Connection to the bus failed
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    /// Serialization of the event failed
    #[error("serialization failed: {0}")]
    SerializationFailed(String),
    /// The bus rejected the event
    #[error("event rejected: {0}")]
    Rejected(String),
}

/// Trait for publishing events to a message bus.
pub trait Publisher: Send + Sync {
    /// Publish a single event to the bus.
    fn publish(&self, event: Event) -> Result<(), PublishError>;

    /// Payload format this publisher's transport carries.
    fn payload_format(&self) -> PayloadFormat {
        PayloadFormat::Binary
    }
}
