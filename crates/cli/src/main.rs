//! Rackstock CLI - rack and product management plus database migrations.
//!
//! # Usage
//!
//! ```bash
//! # Apply the racks/products schema to DATABASE_URL
//! rackstock migrate
//!
//! # Check that the configured store is reachable
//! rackstock check
//!
//! # Racks
//! rackstock rack list R1
//! rackstock rack add R3-A
//! rackstock rack rename R3-A R3-B
//! rackstock rack delete R3-B
//!
//! # Products
//! rackstock product search mouse
//! rackstock product add --rack R1-A --name "Desk Lamp" --qty 3 --price 19.99
//! rackstock product update 5 --qty 2 --clear-barcode
//! ```
//!
//! Results are printed to stdout as JSON. Logs go to stderr, filtered by
//! `RUST_LOG` (default `warn`).
//!
//! # Exit codes
//!
//! - `0` - success
//! - `1` - the command failed and nothing was left half-done
//! - `2` - a rack rename or delete was only partially applied

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rackstock_core::{Price, ProductId, RackId};
use rackstock_inventory::{InventoryError, ProductDraft, ProductPatch};

mod commands;

#[derive(Parser)]
#[command(name = "rackstock")]
#[command(author, version, about = "Rack and product inventory tools")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations against `DATABASE_URL`
    Migrate,
    /// Verify the configured store is reachable
    Check,
    /// Manage racks
    Rack {
        #[command(subcommand)]
        action: RackAction,
    },
    /// Manage products
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum RackAction {
    /// List racks, optionally filtered by a substring of the rack id
    List {
        #[arg(default_value = "")]
        query: String,
    },
    /// Register a new rack
    Add { rack_id: RackId },
    /// Rename a rack and move its products to the new id
    Rename { old: RackId, new: RackId },
    /// Delete a rack and every product on it
    Delete { rack_id: RackId },
    /// Move all products from one rack id to another
    Reassign { from: RackId, to: RackId },
}

#[derive(Subcommand)]
enum ProductAction {
    /// Search products by name
    Search {
        #[arg(default_value = "")]
        query: String,
    },
    /// Show one product
    Get { id: ProductId },
    /// List products on a rack
    ByRack { rack_id: RackId },
    /// Find products by exact barcode
    ByBarcode { barcode: String },
    /// Add a product to a rack
    Add(AddProductArgs),
    /// Change fields of a product
    Update(UpdateProductArgs),
    /// Delete a product
    Delete { id: ProductId },
}

#[derive(Args)]
struct AddProductArgs {
    /// Rack the product is stored on
    #[arg(short, long)]
    rack: RackId,

    /// Product name
    #[arg(short, long)]
    name: String,

    #[arg(short, long)]
    barcode: Option<String>,

    #[arg(short, long, default_value_t = 1)]
    qty: u32,

    /// Unit price, e.g. `19.99`
    #[arg(short, long, default_value_t = Price::ZERO)]
    price: Price,
}

#[derive(Args)]
struct UpdateProductArgs {
    id: ProductId,

    #[arg(short, long)]
    name: Option<String>,

    #[arg(short, long, conflicts_with = "clear_barcode")]
    barcode: Option<String>,

    /// Remove the product's barcode
    #[arg(long)]
    clear_barcode: bool,

    #[arg(short, long)]
    qty: Option<u32>,

    #[arg(short, long)]
    price: Option<Price>,

    /// Move the product to another rack
    #[arg(short, long)]
    rack: Option<RackId>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        let code = match e.downcast_ref::<InventoryError>() {
            Some(err) if err.is_partial() => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Check => commands::check::run(&commands::service()?).await?,
        Commands::Rack { action } => rack(action).await?,
        Commands::Product { action } => product(action).await?,
    }
    Ok(())
}

async fn rack(action: RackAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = commands::service()?;
    match action {
        RackAction::List { query } => commands::racks::list(&service, &query).await,
        RackAction::Add { rack_id } => commands::racks::add(&service, rack_id).await,
        RackAction::Rename { old, new } => commands::racks::rename(&service, &old, &new).await,
        RackAction::Delete { rack_id } => commands::racks::delete(&service, &rack_id).await,
        RackAction::Reassign { from, to } => commands::racks::reassign(&service, &from, &to).await,
    }
}

async fn product(action: ProductAction) -> Result<(), Box<dyn std::error::Error>> {
    let service = commands::service()?;
    match action {
        ProductAction::Search { query } => commands::products::search(&service, &query).await,
        ProductAction::Get { id } => commands::products::get(&service, id).await,
        ProductAction::ByRack { rack_id } => commands::products::by_rack(&service, &rack_id).await,
        ProductAction::ByBarcode { barcode } => {
            commands::products::by_barcode(&service, &barcode).await
        }
        ProductAction::Add(args) => {
            let mut draft = ProductDraft::new(args.rack, args.name)
                .with_qty(args.qty)
                .with_price(args.price);
            if let Some(barcode) = args.barcode {
                draft = draft.with_barcode(barcode);
            }
            commands::products::add(&service, draft).await
        }
        ProductAction::Update(args) => {
            let id = args.id;
            commands::products::update(&service, id, update_patch(args)).await
        }
        ProductAction::Delete { id } => commands::products::delete(&service, id).await,
    }
}

fn update_patch(args: UpdateProductArgs) -> ProductPatch {
    let barcode = if args.clear_barcode {
        Some(None)
    } else {
        args.barcode.map(Some)
    };
    ProductPatch {
        product_name: args.name,
        barcode,
        qty: args.qty,
        price: args.price,
        rack_id: args.rack,
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_patch_clear_barcode() {
        let cli = Cli::try_parse_from(["rackstock", "product", "update", "7", "--clear-barcode"])
            .unwrap_or_else(|e| panic!("{e}"));
        let Commands::Product {
            action: ProductAction::Update(args),
        } = cli.command
        else {
            panic!("expected product update");
        };
        let patch = update_patch(args);
        assert_eq!(patch.barcode, Some(None));
        assert!(patch.qty.is_none());
    }

    #[test]
    fn test_rejects_blank_rack_id() {
        assert!(Cli::try_parse_from(["rackstock", "rack", "add", "  "]).is_err());
    }
}
