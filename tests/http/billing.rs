use std::sync::Arc;

use serde_json::json;
use sweetshop::orders::{self, BillingHandler, Order, Subscription};

use crate::support::start_server;

fn order_json() -> serde_json::Value {
    json!({
        "name": "Ada",
        "address": "1 Candy Lane",
        "email": "ada@example.com",
        "phone": "555-0100",
        "paymentMethod": "Credit card",
        "sweets": [{ "name": "Lollypop", "price": 0.5, "quantity": 4 }]
    })
}

#[tokio::test]
async fn advertises_orders_subscription() {
    let base = start_server(orders::router(Arc::new(BillingHandler::new()))).await;

    let subs: Vec<Subscription> = reqwest::get(format!("{base}/dapr/subscribe"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(
        subs,
        vec![Subscription {
            pubsubname: "pubsub".into(),
            topic: "orders".into(),
            route: "/orders".into(),
        }]
    );
}

#[tokio::test]
async fn order_event_is_echoed_and_billed_once() {
    let handler = Arc::new(BillingHandler::new());
    let base = start_server(orders::router(handler.clone())).await;
    let client = reqwest::Client::new();

    let envelope = json!({
        "id": "evt-1",
        "type": "com.dapr.event.sent",
        "topic": "orders",
        "pubsubname": "pubsub",
        "data": order_json(),
    });

    for _ in 0..2 {
        let resp = client
            .post(format!("{base}/orders"))
            .json(&envelope)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let echoed: Order = resp.json().await.unwrap();
        assert_eq!(echoed.name, "Ada");
        assert_eq!(echoed.payment_method, "Credit card");
        assert_eq!(echoed.total(), 2.0);
    }

    assert_eq!(handler.processed_count(), 1);
}

#[tokio::test]
async fn malformed_order_is_rejected() {
    let base = start_server(orders::router(Arc::new(BillingHandler::new()))).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/orders"))
        .json(&json!({ "data": { "name": "Ada" } }))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}
