//! WarehouseClient - the shop's HTTP view of the warehouse inventory.
//!
//! Requires the `http` feature.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::inventory::Item;

/// Error type for warehouse calls.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("warehouse request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("warehouse answered {status}: {body}")]
    Status { status: u16, body: String },
}

/// Calls the warehouse routes served by `inventory::router`.
#[derive(Debug, Clone)]
pub struct WarehouseClient {
    client: reqwest::Client,
    base_url: String,
}

impl WarehouseClient {
    /// Client for the warehouse at `base_url` (for example `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `GET /inventory`
    pub async fn get_inventory(&self) -> Result<Vec<Item>, ClientError> {
        let response = self
            .client
            .get(format!("{}/inventory", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        Ok(response.json().await?)
    }

    /// `POST /inventory`. Failures are logged and reported as `false`.
    pub async fn add_to_inventory(&self, item: &Item) -> bool {
        match self.try_add(item).await {
            Ok(()) => true,
            Err(err) => {
                warn!(item = %item.name, error = %err, "failed to add item to inventory");
                false
            }
        }
    }

    async fn try_add(&self, item: &Item) -> Result<(), ClientError> {
        let response = self
            .client
            .post(format!("{}/inventory", self.base_url))
            .json(item)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::status_error(response).await);
        }
        Ok(())
    }

    async fn status_error(response: reqwest::Response) -> ClientError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ClientError::Status { status, body }
    }
}
