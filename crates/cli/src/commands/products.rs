//! Product commands.
//!
//! # Usage
//!
//! ```bash
//! rackstock product search [QUERY]
//! rackstock product get 5
//! rackstock product by-rack R1-A
//! rackstock product by-barcode 123456789
//! rackstock product add -r R1-A -n "Desk Lamp" -b 555000111 -q 3 -p 19.99
//! rackstock product update 5 --qty 2 --rack R2-A
//! rackstock product delete 5
//! ```

use rackstock_core::{ProductId, RackId};
use rackstock_inventory::{InventoryService, ProductDraft, ProductPatch, StoreBackend};

use super::{CommandResult, print_json};

type Service = InventoryService<StoreBackend>;

pub async fn search(service: &Service, query: &str) -> CommandResult {
    print_json(&service.get_products(query).await?)
}

pub async fn get(service: &Service, id: ProductId) -> CommandResult {
    print_json(&service.get_product(id).await?)
}

pub async fn by_rack(service: &Service, rack_id: &RackId) -> CommandResult {
    print_json(&service.get_products_by_rack(rack_id).await?)
}

pub async fn by_barcode(service: &Service, barcode: &str) -> CommandResult {
    print_json(&service.get_products_by_barcode(barcode).await?)
}

pub async fn add(service: &Service, draft: ProductDraft) -> CommandResult {
    print_json(&service.add_product(draft).await?)
}

pub async fn update(service: &Service, id: ProductId, patch: ProductPatch) -> CommandResult {
    print_json(&service.update_product(id, patch).await?)
}

pub async fn delete(service: &Service, id: ProductId) -> CommandResult {
    print_json(&service.delete_product(id).await?)
}
