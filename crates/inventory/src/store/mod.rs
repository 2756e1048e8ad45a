//! Store adapter: the persistence surface the inventory service talks to.
//!
//! # Tables
//!
//! - `racks` - `id`, `rack_id` (unique), `created_at`
//! - `products` - `id`, `product_name`, `barcode`, `qty`, `price`, `rack_id`, `created_at`
//!
//! `products.rack_id` holds a copy of the rack's natural key. There is no
//! foreign key; [`crate::service::InventoryService`] keeps the two tables in
//! step.
//!
//! # Backends
//!
//! - [`MemoryStore`] - in-process mock used when no hosted store is configured
//! - [`PostgRestStore`] - hosted PostgREST endpoint (Supabase)
//!
//! [`StoreBackend`] picks one of them once, at startup, from
//! [`crate::config::InventoryConfig`].

mod error;
mod filter;
pub mod memory;
pub mod postgrest;

use std::future::Future;

pub use error::{StoreError, StoreResult};
pub use filter::{ProductFilter, ProductOrder, RackFilter};
pub use memory::MemoryStore;
pub use postgrest::PostgRestStore;

use crate::config::InventoryConfig;
use crate::models::{NewProduct, NewRack, Product, ProductPatch, Rack, RackPatch};

/// Row-level operations on the `racks` and `products` tables.
///
/// Every call is independent: nothing here is atomic across calls, and
/// writes return the rows they affected.
pub trait Store: Send + Sync {
    /// Short backend name for logs.
    fn backend_name(&self) -> &'static str;

    /// Select racks matching `filter`.
    fn select_racks(&self, filter: &RackFilter)
    -> impl Future<Output = StoreResult<Vec<Rack>>> + Send;

    /// Insert one rack. Fails with [`StoreError::UniqueViolation`] if the `rack_id` exists.
    fn insert_rack(&self, rack: &NewRack) -> impl Future<Output = StoreResult<Rack>> + Send;

    /// Update racks matching `filter`, returning the updated rows.
    fn update_racks(
        &self,
        filter: &RackFilter,
        patch: &RackPatch,
    ) -> impl Future<Output = StoreResult<Vec<Rack>>> + Send;

    /// Delete racks matching `filter`, returning the removed rows.
    fn delete_racks(&self, filter: &RackFilter)
    -> impl Future<Output = StoreResult<Vec<Rack>>> + Send;

    /// Select products matching `filter`.
    fn select_products(
        &self,
        filter: &ProductFilter,
        order: ProductOrder,
    ) -> impl Future<Output = StoreResult<Vec<Product>>> + Send;

    /// Insert one product.
    fn insert_product(
        &self,
        product: &NewProduct,
    ) -> impl Future<Output = StoreResult<Product>> + Send;

    /// Update products matching `filter`, returning the updated rows.
    fn update_products(
        &self,
        filter: &ProductFilter,
        patch: &ProductPatch,
    ) -> impl Future<Output = StoreResult<Vec<Product>>> + Send;

    /// Delete products matching `filter`, returning the removed rows.
    fn delete_products(
        &self,
        filter: &ProductFilter,
    ) -> impl Future<Output = StoreResult<Vec<Product>>> + Send;

    /// Check that both tables are reachable.
    fn ping(&self) -> impl Future<Output = StoreResult<()>> + Send;
}

/// The store selected from configuration.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    Memory(MemoryStore),
    PostgRest(PostgRestStore),
}

impl StoreBackend {
    /// Build the backend described by `config`.
    ///
    /// A hosted store is used only when both its URL and key were supplied;
    /// otherwise the mock is returned without error.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client for the hosted store fails to build.
    pub fn from_config(config: &InventoryConfig) -> StoreResult<Self> {
        if let Some(remote) = config.remote() {
            tracing::info!(url = %remote.url, "Using hosted PostgREST store");
            return Ok(Self::PostgRest(PostgRestStore::new(remote)?));
        }

        tracing::info!(
            seeded = config.mock.seed,
            "No hosted store configured, using in-memory mock"
        );
        let store = if config.mock.seed {
            MemoryStore::seeded()
        } else {
            MemoryStore::new()
        };
        Ok(Self::Memory(store.with_latency(config.mock.latency)))
    }

    /// True when running against the in-memory mock.
    #[must_use]
    pub const fn is_mock(&self) -> bool {
        matches!(self, Self::Memory(_))
    }
}

impl Store for StoreBackend {
    fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(s) => s.backend_name(),
            Self::PostgRest(s) => s.backend_name(),
        }
    }

    async fn select_racks(&self, filter: &RackFilter) -> StoreResult<Vec<Rack>> {
        match self {
            Self::Memory(s) => s.select_racks(filter).await,
            Self::PostgRest(s) => s.select_racks(filter).await,
        }
    }

    async fn insert_rack(&self, rack: &NewRack) -> StoreResult<Rack> {
        match self {
            Self::Memory(s) => s.insert_rack(rack).await,
            Self::PostgRest(s) => s.insert_rack(rack).await,
        }
    }

    async fn update_racks(&self, filter: &RackFilter, patch: &RackPatch) -> StoreResult<Vec<Rack>> {
        match self {
            Self::Memory(s) => s.update_racks(filter, patch).await,
            Self::PostgRest(s) => s.update_racks(filter, patch).await,
        }
    }

    async fn delete_racks(&self, filter: &RackFilter) -> StoreResult<Vec<Rack>> {
        match self {
            Self::Memory(s) => s.delete_racks(filter).await,
            Self::PostgRest(s) => s.delete_racks(filter).await,
        }
    }

    async fn select_products(
        &self,
        filter: &ProductFilter,
        order: ProductOrder,
    ) -> StoreResult<Vec<Product>> {
        match self {
            Self::Memory(s) => s.select_products(filter, order).await,
            Self::PostgRest(s) => s.select_products(filter, order).await,
        }
    }

    async fn insert_product(&self, product: &NewProduct) -> StoreResult<Product> {
        match self {
            Self::Memory(s) => s.insert_product(product).await,
            Self::PostgRest(s) => s.insert_product(product).await,
        }
    }

    async fn update_products(
        &self,
        filter: &ProductFilter,
        patch: &ProductPatch,
    ) -> StoreResult<Vec<Product>> {
        match self {
            Self::Memory(s) => s.update_products(filter, patch).await,
            Self::PostgRest(s) => s.update_products(filter, patch).await,
        }
    }

    async fn delete_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        match self {
            Self::Memory(s) => s.delete_products(filter).await,
            Self::PostgRest(s) => s.delete_products(filter).await,
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        match self {
            Self::Memory(s) => s.ping().await,
            Self::PostgRest(s) => s.ping().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::{InventoryConfig, MockConfig};

    fn mock_config(seed: bool) -> InventoryConfig {
        InventoryConfig {
            remote: None,
            strict_racks: false,
            mock: MockConfig {
                seed,
                latency: Duration::ZERO,
            },
        }
    }

    #[tokio::test]
    async fn test_unconfigured_selects_seeded_mock() {
        let backend = StoreBackend::from_config(&mock_config(true)).unwrap();
        assert!(backend.is_mock());
        assert_eq!(backend.backend_name(), "memory");

        let racks = backend.select_racks(&RackFilter::All).await.unwrap();
        assert_eq!(racks.len(), 4);
    }

    #[tokio::test]
    async fn test_unseeded_mock_starts_empty() {
        let backend = StoreBackend::from_config(&mock_config(false)).unwrap();
        let products = backend
            .select_products(&ProductFilter::All, ProductOrder::Unordered)
            .await
            .unwrap();
        assert!(products.is_empty());
    }
}
