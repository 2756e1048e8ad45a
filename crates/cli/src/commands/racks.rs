//! Rack commands.
//!
//! # Usage
//!
//! ```bash
//! rackstock rack list [QUERY]
//! rackstock rack add R3-A
//! rackstock rack rename R3-A R3-B
//! rackstock rack delete R3-B
//! rackstock rack reassign R3-A R3-B
//! ```
//!
//! `rename` and `delete` touch both tables. If the second step fails the
//! command exits with status 2; re-running `delete` or running `reassign`
//! finishes the job.

use rackstock_core::RackId;
use rackstock_inventory::{InventoryService, StoreBackend};

use super::{CommandResult, print_json};

type Service = InventoryService<StoreBackend>;

pub async fn list(service: &Service, query: &str) -> CommandResult {
    print_json(&service.get_racks(query).await?)
}

pub async fn add(service: &Service, rack_id: RackId) -> CommandResult {
    print_json(&service.add_rack(rack_id).await?)
}

pub async fn rename(service: &Service, old: &RackId, new: &RackId) -> CommandResult {
    print_json(&service.rename_rack(old, new).await?)
}

pub async fn delete(service: &Service, rack_id: &RackId) -> CommandResult {
    let deletion = service.delete_rack(rack_id).await?;
    if !deletion.rack_removed {
        tracing::warn!(rack_id = %rack_id, "No rack with this id existed");
    }
    print_json(&deletion)
}

pub async fn reassign(service: &Service, from: &RackId, to: &RackId) -> CommandResult {
    print_json(&service.reassign_products(from, to).await?)
}
