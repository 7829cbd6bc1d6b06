//! SidecarPublisher - publishes through the pub/sub API of a Dapr-style sidecar.
//!
//! Requires the `http` feature. The client is blocking, like the rest of the
//! bus; from async code call it on `tokio::task::spawn_blocking`.
//!
//! ## Route used
//!
//! - `POST {base}/v1.0/publish/{pubsub}/{topic}?metadata.cloudevent.id={id}`:
//!   body is the event payload, sent as JSON; any 2xx means accepted.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use super::{Event, PayloadFormat, PublishError, Publisher, PUBSUB_METADATA};

/// Publisher reaching a broker through the sidecar's HTTP publish API.
pub struct SidecarPublisher {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl SidecarPublisher {
    /// Create a publisher for the sidecar at `base_url` (e.g. `http://127.0.0.1:3500`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PublishError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PublishError::ConnectionFailed(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::blocking::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Publisher for SidecarPublisher {
    fn publish(&self, event: Event) -> Result<(), PublishError> {
        let pubsub = event.metadata_value(PUBSUB_METADATA).ok_or_else(|| {
            PublishError::Rejected(format!("event {} names no pub/sub component", event.id))
        })?;
        let url = format!("{}/v1.0/publish/{}/{}", self.base_url, pubsub, event.topic);

        let resp = self
            .client
            .post(&url)
            .query(&[("metadata.cloudevent.id", event.id.as_str())])
            .header(CONTENT_TYPE, event.format().content_type())
            .body(event.payload.clone())
            .send()
            .map_err(|e| PublishError::ConnectionFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(PublishError::Rejected(format!("POST {} returned {}", url, status)));
        }
        Ok(())
    }

    fn payload_format(&self) -> PayloadFormat {
        PayloadFormat::Json
    }
}
