//! Store connectivity check.
//!
//! # Usage
//!
//! ```bash
//! rackstock check
//! ```
//!
//! Pings both tables, then reports which backend answered and how many
//! racks and products it holds.

use serde_json::json;

use rackstock_inventory::{InventoryService, Store, StoreBackend};

use super::{CommandResult, print_json};

/// Ping the store and print a short summary.
///
/// # Errors
///
/// Returns an error if the store cannot be reached or either table cannot
/// be read.
pub async fn run(service: &InventoryService<StoreBackend>) -> CommandResult {
    service.check_connection().await?;

    let racks = service.get_racks("").await?;
    let products = service.get_products("").await?;

    print_json(&json!({
        "backend": service.store().backend_name(),
        "mock": service.store().is_mock(),
        "racks": racks.len(),
        "products": products.len(),
    }))
}
