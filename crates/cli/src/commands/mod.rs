//! CLI subcommand implementations.

pub mod check;
pub mod migrate;
pub mod products;
pub mod racks;

use serde::Serialize;

use rackstock_inventory::{InventoryConfig, InventoryService, StoreBackend};

/// Result type shared by the rack and product commands.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Inventory service over the backend configured in the environment.
pub fn service() -> Result<InventoryService<StoreBackend>, Box<dyn std::error::Error>> {
    let config = InventoryConfig::from_env()?;
    Ok(InventoryService::from_config(&config)?)
}

/// Print `value` to stdout as pretty JSON.
fn print_json<T: Serialize + ?Sized>(value: &T) -> CommandResult {
    let out = serde_json::to_string_pretty(value)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{out}");
    }
    Ok(())
}
