//! Integration tests for product lookups and writes.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use rackstock_core::{Price, ProductId};
use rackstock_integration_tests::{StoreOp, rack, seeded_service};
use rackstock_inventory::{
    InventoryConfig, InventoryError, InventoryService, Missing, ProductDraft, ProductPatch,
};

// =============================================================================
// Lookups
// =============================================================================

#[tokio::test]
async fn test_search_is_case_insensitive_and_sorted() {
    let (service, _store) = seeded_service();

    let names: Vec<String> = service
        .get_products("")
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.product_name)
        .collect();
    assert_eq!(
        names,
        ["Mechanical Keyboard", "Monitor Stand", "USB-C Cable", "Wireless Mouse"]
    );

    let found = service.get_products("  MOUSE ").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found.first().unwrap().product_name, "Wireless Mouse");
}

#[tokio::test]
async fn test_lookup_by_rack_and_barcode() {
    let (service, _store) = seeded_service();

    let on_rack = service.get_products_by_rack(&rack("R2-A")).await.unwrap();
    assert_eq!(on_rack.len(), 1);
    assert_eq!(on_rack.first().unwrap().product_name, "USB-C Cable");

    assert!(service.get_products_by_rack(&rack("r2-a")).await.unwrap().is_empty());

    let by_code = service.get_products_by_barcode("789123456").await.unwrap();
    assert_eq!(by_code.first().unwrap().rack_id, rack("R2-B"));
}

#[tokio::test]
async fn test_lookup_failure_is_transport() {
    let (service, store) = seeded_service();
    store.fail(StoreOp::SelectProducts);

    let err = service.get_products("").await.unwrap_err();
    assert!(matches!(err, InventoryError::Transport(_)));
}

// =============================================================================
// Writes
// =============================================================================

#[tokio::test]
async fn test_add_then_find() {
    let (service, _store) = seeded_service();

    let added = service
        .add_product(
            ProductDraft::new(rack("R1-A"), "  Desk Lamp ")
                .with_barcode("555000111")
                .with_qty(3)
                .with_price("19.99".parse::<Price>().unwrap()),
        )
        .await
        .unwrap();

    assert_eq!(added.id, ProductId::new(5));
    assert_eq!(added.product_name, "Desk Lamp");
    assert_eq!(service.get_products_by_rack(&rack("R1-A")).await.unwrap().len(), 2);
    assert_eq!(service.get_product(added.id).await.unwrap(), added);
}

#[tokio::test]
async fn test_update_merges_fields() {
    let (service, _store) = seeded_service();
    let id = ProductId::new(1);

    let updated = service
        .update_product(id, ProductPatch::default().with_qty(7).with_rack(rack("R2-A")))
        .await
        .unwrap();

    assert_eq!(updated.qty, 7);
    assert_eq!(updated.rack_id, rack("R2-A"));
    assert_eq!(updated.product_name, "Wireless Mouse");
    assert_eq!(updated.barcode.as_deref(), Some("123456789"));
    assert_eq!(updated.price, Price::from_units(25));
}

#[tokio::test]
async fn test_update_clears_barcode() {
    let (service, _store) = seeded_service();

    let updated = service
        .update_product(ProductId::new(3), ProductPatch::default().with_barcode(None))
        .await
        .unwrap();

    assert!(updated.barcode.is_none());
    assert!(service.get_products_by_barcode("456123789").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_rejects_blank_name() {
    let (service, store) = seeded_service();

    let err = service
        .update_product(ProductId::new(1), ProductPatch::default().with_name(" "))
        .await
        .unwrap_err();

    assert!(matches!(err, InventoryError::Invalid(_)));
    assert!(store.calls().is_empty());
}

#[tokio::test]
async fn test_delete_product_twice() {
    let (service, _store) = seeded_service();
    let id = ProductId::new(4);

    let removed = service.delete_product(id).await.unwrap();
    assert_eq!(removed.product_name, "Monitor Stand");

    let before = service.get_products("").await.unwrap();
    let err = service.delete_product(id).await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(Missing::Product(missing)) if missing == id));
    assert_eq!(service.get_products("").await.unwrap(), before);
}

// =============================================================================
// Configuration and wire shape
// =============================================================================

#[tokio::test]
async fn test_service_from_empty_environment() {
    let config = InventoryConfig::from_lookup(|_| None).unwrap();
    let service = InventoryService::from_config(&config).unwrap();

    assert!(service.store().is_mock());
    service.check_connection().await.unwrap();
    assert_eq!(service.get_racks("").await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_strict_racks_from_environment() {
    let config = InventoryConfig::from_lookup(|key| {
        (key == "INVENTORY_STRICT_RACKS").then(|| "true".to_string())
    })
    .unwrap();
    let service = InventoryService::from_config(&config).unwrap();

    let err = service
        .add_product(ProductDraft::new(rack("R9"), "Lamp"))
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(Missing::Rack(_))));
}

#[tokio::test]
async fn test_product_json_shape() {
    let (service, _store) = seeded_service();
    let product = service.get_product(ProductId::new(2)).await.unwrap();

    let value = serde_json::to_value(&product).unwrap();
    assert_eq!(value["id"], json!(2));
    assert_eq!(value["product_name"], json!("Mechanical Keyboard"));
    assert_eq!(value["barcode"], json!("987654321"));
    assert_eq!(value["qty"], json!(5));
    assert_eq!(value["price"], json!(120.0));
    assert_eq!(value["rack_id"], json!("R1-B"));
}
