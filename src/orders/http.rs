//! HTTP transport for billing - the sidecar-facing subscription endpoint.
//!
//! Requires the `http` feature.
//!
//! ## Routes
//!
//! - `GET /dapr/subscribe`: the topics this service subscribes to.
//! - `POST /orders`: a CloudEvent whose `data` is an [`Order`]; answers with the order.
//! - `GET /health`: `{ "ok": true }`.

use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::billing::BillingHandler;
use super::order::Order;
use super::{ORDERS_TOPIC, PUBSUB_NAME};

/// Route the sidecar delivers `orders` messages to.
pub const ORDERS_ROUTE: &str = "/orders";

/// CloudEvents envelope as delivered by the sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudEvent<T> {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub pubsubname: Option<String>,
    pub data: T,
}

/// One entry of the programmatic subscription list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub pubsubname: String,
    pub topic: String,
    pub route: String,
}

/// Build an axum `Router` for the billing service.
pub fn router(handler: Arc<BillingHandler>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/dapr/subscribe", get(subscriptions_handler))
        .route(ORDERS_ROUTE, post(order_handler))
        .with_state(handler)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `GET /dapr/subscribe`
async fn subscriptions_handler() -> Json<Vec<Subscription>> {
    Json(vec![Subscription {
        pubsubname: PUBSUB_NAME.to_string(),
        topic: ORDERS_TOPIC.to_string(),
        route: ORDERS_ROUTE.to_string(),
    }])
}

/// `POST /orders`
async fn order_handler(
    State(handler): State<Arc<BillingHandler>>,
    Json(event): Json<CloudEvent<Order>>,
) -> Json<Order> {
    Json(handler.receive(event.id.as_deref(), event.data).into_order())
}
