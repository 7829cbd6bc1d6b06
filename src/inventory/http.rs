//! HTTP transport for the inventory - the warehouse service's routes.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `GET /inventory`: the current inventory as a JSON array (empty if the backend failed).
//! - `POST /inventory`: upsert the JSON `Item` body; 201 on success, 500 on any failure
//!   (an unreadable body included).
//! - `PUT /inventory/:name/quantity`: body `{ "quantity": n }`; 200 with the updated item.
//! - `GET /health`: `{ "ok": true }`.
//!
//! Failures answer `{ "error": "...", "kind": "..." }`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use super::error::InventoryError;
use super::item::Item;
use super::store::{InventoryStore, Upserted};
use crate::kv::KvStore;

/// Body of `PUT /inventory/:name/quantity`.
#[derive(Debug, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

/// Build an axum `Router` serving the inventory of the given store.
pub fn router<S: KvStore + 'static>(store: Arc<InventoryStore<S>>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/inventory",
            get(list_handler::<S>).post(upsert_handler::<S>),
        )
        .route("/inventory/:name/quantity", put(adjust_handler::<S>))
        .with_state(store)
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `GET /inventory`
async fn list_handler<S: KvStore + 'static>(
    State(store): State<Arc<InventoryStore<S>>>,
) -> Json<Vec<Item>> {
    Json(store.fetch_inventory().await)
}

/// `POST /inventory`
async fn upsert_handler<S: KvStore + 'static>(
    State(store): State<Arc<InventoryStore<S>>>,
    body: Result<Json<Item>, JsonRejection>,
) -> Response {
    let item = match body {
        Ok(Json(item)) => item,
        Err(rejection) => {
            let err = InventoryError::Invalid(rejection.body_text());
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &err);
        }
    };

    let name = item.name.clone();
    match store.upsert_item(item).await {
        Ok(outcome) => {
            let result = match outcome {
                Upserted::Inserted => "inserted",
                Upserted::Replaced => "replaced",
            };
            (
                StatusCode::CREATED,
                Json(json!({ "name": name, "result": result })),
            )
                .into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

/// `PUT /inventory/:name/quantity`
async fn adjust_handler<S: KvStore + 'static>(
    State(store): State<Arc<InventoryStore<S>>>,
    Path(name): Path<String>,
    Json(update): Json<QuantityUpdate>,
) -> Response {
    match store.adjust_quantity(&name, update.quantity).await {
        Ok(item) => (StatusCode::OK, Json(item)).into_response(),
        Err(e) => error_response(status_code(&e), &e),
    }
}

/// Status for `PUT` failures; `POST` answers every failure with 500.
fn status_code(err: &InventoryError) -> StatusCode {
    match err {
        InventoryError::NotFound(_) => StatusCode::NOT_FOUND,
        InventoryError::Invalid(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(status: StatusCode, err: &InventoryError) -> Response {
    let body = json!({ "error": err.to_string(), "kind": err.kind() });
    (status, Json(body)).into_response()
}
