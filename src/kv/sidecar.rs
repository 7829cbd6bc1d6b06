//! SidecarKvStore - state API client for a Dapr-style sidecar.
//!
//! Requires the `http` feature.
//!
//! ## Routes used
//!
//! - `GET {base}/v1.0/state/{store}/{key}`: 200 with the value and an `ETag`
//!   header, 204 (or 404) when the key does not exist.
//! - `POST {base}/v1.0/state/{store}`: body is a list of state items; 2xx on
//!   success, 409/412 when the etag no longer matches.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ETAG;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

use super::{ETag, KvError, KvStore, Precondition, Versioned};

/// Key-value backend reached over the sidecar's HTTP state API.
#[derive(Clone)]
pub struct SidecarKvStore {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct StateItem<'a> {
    key: &'a str,
    value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    etag: Option<&'a str>,
    options: StateOptions,
}

#[derive(Serialize)]
struct StateOptions {
    concurrency: &'static str,
}

impl SidecarKvStore {
    /// Create a client for the sidecar at `base_url` (e.g. `http://127.0.0.1:3500`).
    ///
    /// `timeout` bounds every request, connect included.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, KvError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KvError::Unavailable(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn state_url(&self, store: &str) -> String {
        format!("{}/v1.0/state/{}", self.base_url, store)
    }
}

#[async_trait]
impl KvStore for SidecarKvStore {
    async fn get(&self, store: &str, key: &str) -> Result<Option<Versioned<Vec<u8>>>, KvError> {
        let url = format!("{}/{}", self.state_url(store), key);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| KvError::Unavailable(e.to_string()))?;

        match resp.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => return Ok(None),
            status if !status.is_success() => {
                return Err(KvError::Unavailable(format!("GET {} returned {}", url, status)))
            }
            _ => {}
        }

        let etag = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(|v| ETag::new(v.trim_matches('"')))
            .ok_or_else(|| KvError::Malformed(format!("GET {} returned no etag", url)))?;

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| KvError::Unavailable(e.to_string()))?;

        if bytes.is_empty() {
            return Ok(None);
        }

        Ok(Some(Versioned {
            data: bytes.to_vec(),
            etag,
        }))
    }

    async fn put(
        &self,
        store: &str,
        key: &str,
        value: Vec<u8>,
        precondition: Precondition,
    ) -> Result<ETag, KvError> {
        let value: Value =
            serde_json::from_slice(&value).map_err(|e| KvError::Malformed(e.to_string()))?;

        let (etag, concurrency) = match &precondition {
            Precondition::Any => (None, "last-write"),
            Precondition::Absent => (None, "first-write"),
            Precondition::Matches(etag) => (Some(etag.as_str()), "first-write"),
        };

        let body = [StateItem {
            key,
            value,
            etag,
            options: StateOptions { concurrency },
        }];

        let url = self.state_url(store);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| KvError::Unavailable(e.to_string()))?;

        match resp.status() {
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => Err(KvError::Conflict {
                store: store.to_string(),
                key: key.to_string(),
                expected: precondition,
                actual: None,
            }),
            status if !status.is_success() => {
                Err(KvError::Unavailable(format!("POST {} returned {}", url, status)))
            }
            _ => {
                // The save response carries no version; read it back.
                let stored = self.get(store, key).await?.ok_or_else(|| {
                    KvError::Malformed(format!("{}/{} missing right after save", store, key))
                })?;
                Ok(stored.etag)
            }
        }
    }
}
