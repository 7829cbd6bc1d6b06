use sweetshop::inventory::{InventoryError, Item, Upserted};

use crate::support::{names, persisted, store};

#[tokio::test]
async fn upsert_new_name_appends_one() {
    let (store, kv) = store();
    let before = store.fetch_inventory().await;

    let outcome = store
        .upsert_item(Item::new("Marshmallow", 0.99, 50))
        .await
        .unwrap();
    assert_eq!(outcome, Upserted::Inserted);

    let after = store.fetch_inventory().await;
    assert_eq!(after.len(), before.len() + 1);
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.last(), Some(&Item::new("Marshmallow", 0.99, 50)));
    assert_eq!(persisted(&kv), Some(after));
}

#[tokio::test]
async fn upsert_on_missing_record_keeps_defaults() {
    let (store, _kv) = store();

    store
        .upsert_item(Item::new("Marshmallow", 0.99, 50))
        .await
        .unwrap();

    assert_eq!(
        names(&store.fetch_inventory().await),
        ["Chocolate", "Lollypop", "Gummi", "Marshmallow"]
    );
}

#[tokio::test]
async fn upsert_existing_name_replaces_in_place() {
    let (store, _kv) = store();
    store.fetch_inventory().await;

    let outcome = store
        .upsert_item(Item::new("Lollypop", 0.6, 10))
        .await
        .unwrap();
    assert_eq!(outcome, Upserted::Replaced);

    let items = store.fetch_inventory().await;
    assert_eq!(names(&items), ["Chocolate", "Lollypop", "Gummi"]);
    assert_eq!(items[1], Item::new("Lollypop", 0.6, 10));
}

#[tokio::test]
async fn upsert_rejects_invalid_items_without_writing() {
    let (store, kv) = store();
    store.fetch_inventory().await;
    let writes = kv.writes();

    let blank = store.upsert_item(Item::new("  ", 1.0, 1)).await;
    let negative = store.upsert_item(Item::new("Fudge", -1.0, 1)).await;

    assert!(matches!(blank, Err(InventoryError::Invalid(_))));
    assert!(matches!(negative, Err(InventoryError::Invalid(_))));
    assert_eq!(kv.writes(), writes);
}

#[tokio::test]
async fn adjust_absent_name_is_not_found() {
    let (store, kv) = store();
    let before = store.fetch_inventory().await;
    let writes = kv.writes();

    let err = store.adjust_quantity("Licorice", 5).await.unwrap_err();

    assert_eq!(err, InventoryError::NotFound("Licorice".into()));
    assert_eq!(store.fetch_inventory().await, before);
    assert_eq!(kv.writes(), writes);
}

#[tokio::test]
async fn adjust_changes_only_quantity() {
    let (store, _kv) = store();
    let before = store.fetch_inventory().await;

    let updated = store.adjust_quantity("Gummi", 7).await.unwrap();
    assert_eq!(updated, Item::new("Gummi", 1.0, 7));

    let after = store.fetch_inventory().await;
    assert_eq!(after[..2], before[..2]);
    assert_eq!(after[2], updated);
}

#[tokio::test]
async fn shop_scenario() {
    let (store, _kv) = store();

    assert_eq!(store.fetch_inventory().await.len(), 3);

    store
        .upsert_item(Item::new("Marshmallow", 0.99, 50))
        .await
        .unwrap();
    assert_eq!(store.fetch_inventory().await.len(), 4);

    store.adjust_quantity("Marshmallow", 10).await.unwrap();

    let items = store.fetch_inventory().await;
    let marshmallow = sweetshop::inventory::find(&items, "Marshmallow").unwrap();
    assert_eq!(marshmallow.quantity, 10);
    assert_eq!(marshmallow.price, 0.99);
}
