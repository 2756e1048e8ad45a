//! Integration test support for rackstock.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rackstock-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `rack_cascade` - rename and delete cascades, including partial failures
//! - `product_catalog` - product lookups and writes through the service
//!
//! Everything runs against the in-memory store. [`FaultyStore`] wraps it so a
//! test can make chosen store calls fail and see which calls were made.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rackstock_core::RackId;
use rackstock_inventory::models::{NewProduct, NewRack, Product, ProductPatch, Rack, RackPatch};
use rackstock_inventory::store::{ProductFilter, ProductOrder, RackFilter, StoreResult};
use rackstock_inventory::{InventoryService, MemoryStore, Store, StoreError};

/// One kind of [`Store`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    SelectRacks,
    InsertRack,
    UpdateRacks,
    DeleteRacks,
    SelectProducts,
    InsertProduct,
    UpdateProducts,
    DeleteProducts,
    Ping,
}

#[derive(Debug, Default)]
struct Faults {
    failing: HashSet<StoreOp>,
    calls: Vec<StoreOp>,
}

/// [`MemoryStore`] wrapper that fails selected operations with a 503.
///
/// Clones share the same data and fault settings.
#[derive(Debug, Clone, Default)]
pub struct FaultyStore {
    inner: MemoryStore,
    faults: Arc<Mutex<Faults>>,
}

impl FaultyStore {
    /// Wrap a store holding the demo racks and products.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            inner: MemoryStore::seeded(),
            faults: Arc::default(),
        }
    }

    /// Make every later `op` call fail.
    pub fn fail(&self, op: StoreOp) {
        self.faults().failing.insert(op);
    }

    /// Let `op` calls succeed again.
    pub fn heal(&self, op: StoreOp) {
        self.faults().failing.remove(&op);
    }

    /// Every call made so far, in order, including failed ones.
    #[must_use]
    pub fn calls(&self) -> Vec<StoreOp> {
        self.faults().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.faults().calls.clear();
    }

    /// The wrapped store, for inspecting data without recording calls.
    #[must_use]
    pub const fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enter(&self, op: StoreOp) -> StoreResult<()> {
        let mut faults = self.faults();
        faults.calls.push(op);
        if faults.failing.contains(&op) {
            return Err(StoreError::Api {
                status: 503,
                message: format!("injected failure in {op:?}"),
            });
        }
        Ok(())
    }
}

impl Store for FaultyStore {
    fn backend_name(&self) -> &'static str {
        "faulty-memory"
    }

    async fn select_racks(&self, filter: &RackFilter) -> StoreResult<Vec<Rack>> {
        self.enter(StoreOp::SelectRacks)?;
        self.inner.select_racks(filter).await
    }

    async fn insert_rack(&self, rack: &NewRack) -> StoreResult<Rack> {
        self.enter(StoreOp::InsertRack)?;
        self.inner.insert_rack(rack).await
    }

    async fn update_racks(&self, filter: &RackFilter, patch: &RackPatch) -> StoreResult<Vec<Rack>> {
        self.enter(StoreOp::UpdateRacks)?;
        self.inner.update_racks(filter, patch).await
    }

    async fn delete_racks(&self, filter: &RackFilter) -> StoreResult<Vec<Rack>> {
        self.enter(StoreOp::DeleteRacks)?;
        self.inner.delete_racks(filter).await
    }

    async fn select_products(
        &self,
        filter: &ProductFilter,
        order: ProductOrder,
    ) -> StoreResult<Vec<Product>> {
        self.enter(StoreOp::SelectProducts)?;
        self.inner.select_products(filter, order).await
    }

    async fn insert_product(&self, product: &NewProduct) -> StoreResult<Product> {
        self.enter(StoreOp::InsertProduct)?;
        self.inner.insert_product(product).await
    }

    async fn update_products(
        &self,
        filter: &ProductFilter,
        patch: &ProductPatch,
    ) -> StoreResult<Vec<Product>> {
        self.enter(StoreOp::UpdateProducts)?;
        self.inner.update_products(filter, patch).await
    }

    async fn delete_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        self.enter(StoreOp::DeleteProducts)?;
        self.inner.delete_products(filter).await
    }

    async fn ping(&self) -> StoreResult<()> {
        self.enter(StoreOp::Ping)?;
        self.inner.ping().await
    }
}

/// Parse a rack id known to be valid.
///
/// # Panics
///
/// Panics if `id` is not a valid rack id.
#[must_use]
pub fn rack(id: &str) -> RackId {
    RackId::parse(id).unwrap_or_else(|e| panic!("invalid rack id {id:?}: {e}"))
}

/// Service over a seeded [`FaultyStore`], plus a handle to that store.
#[must_use]
pub fn seeded_service() -> (InventoryService<FaultyStore>, FaultyStore) {
    let store = FaultyStore::seeded();
    (InventoryService::new(store.clone()), store)
}

/// Every product in `store` whose rack id is `rack_id`.
///
/// # Panics
///
/// Panics if the memory store fails, which it does not.
pub async fn products_on(store: &FaultyStore, rack_id: &RackId) -> Vec<Product> {
    store
        .inner()
        .select_products(&ProductFilter::RackIdEq(rack_id.clone()), ProductOrder::Unordered)
        .await
        .unwrap_or_else(|e| panic!("memory store failed: {e}"))
}

/// The rack row for `rack_id` in `store`, if any.
///
/// # Panics
///
/// Panics if the memory store fails, which it does not.
pub async fn rack_row(store: &FaultyStore, rack_id: &RackId) -> Option<Rack> {
    store
        .inner()
        .select_racks(&RackFilter::RackIdEq(rack_id.clone()))
        .await
        .unwrap_or_else(|e| panic!("memory store failed: {e}"))
        .into_iter()
        .next()
}
