use std::sync::Arc;
use std::time::Duration;

use sweetshop::inventory::{self, default_inventory, InventoryStore, Item};
use sweetshop::kv::InMemoryKvStore;
use sweetshop::shop::{Cart, ClientError, WarehouseClient};

use crate::support::start_server;

async fn start_warehouse() -> WarehouseClient {
    let store = Arc::new(InventoryStore::new(InMemoryKvStore::new()));
    let base = start_server(inventory::router(store)).await;
    WarehouseClient::new(base, Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn lists_and_adds_items() {
    let client = start_warehouse().await;

    assert_eq!(client.get_inventory().await.unwrap(), default_inventory());
    assert!(client.add_to_inventory(&Item::new("Marshmallow", 0.99, 50)).await);

    let items = client.get_inventory().await.unwrap();
    assert_eq!(items.len(), 4);
    assert_eq!(items[3].name, "Marshmallow");
}

#[tokio::test]
async fn rejected_item_reports_false() {
    let client = start_warehouse().await;
    assert!(!client.add_to_inventory(&Item::new("", 1.0, 1)).await);
}

#[tokio::test]
async fn cart_is_bounded_by_listed_stock() {
    let client = start_warehouse().await;
    let listed = client.get_inventory().await.unwrap();
    let gummi = inventory::find(&listed, "Gummi").unwrap();

    let mut cart = Cart::new();
    cart.add(gummi, gummi.quantity).unwrap();
    assert!(cart.add(gummi, 1).is_err());
}

#[tokio::test]
async fn unreachable_warehouse() {
    let client = WarehouseClient::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();
    assert!(matches!(
        client.get_inventory().await,
        Err(ClientError::Transport(_))
    ));
    assert!(!client.add_to_inventory(&Item::new("Fudge", 2.0, 1)).await);
}
