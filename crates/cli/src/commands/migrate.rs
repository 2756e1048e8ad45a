//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! rackstock migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string for the database behind
//!   the hosted store
//!
//! # Migration Files
//!
//! `crates/inventory/migrations/`:
//! ```text
//! migrations/
//! ├── 20260101000001_create_racks.sql
//! └── 20260101000002_create_products.sql
//! ```

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use rackstock_inventory::ConfigError;
use rackstock_inventory::config::required_secret;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Apply the inventory schema.
///
/// # Errors
///
/// Returns error if `DATABASE_URL` is unset, the database is unreachable, or
/// a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = required_secret("DATABASE_URL")?;

    tracing::info!("Connecting to inventory database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Running inventory migrations...");
    sqlx::migrate!("../inventory/migrations").run(&pool).await?;

    tracing::info!("Inventory migrations complete!");
    Ok(())
}
