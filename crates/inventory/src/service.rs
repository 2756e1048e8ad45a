//! Inventory service: every read and write of racks and products goes here.
//!
//! # Rack cascades
//!
//! Products refer to their rack by the rack's natural key, so changing or
//! removing that key touches two tables. The store offers no transaction,
//! so each cascade is two ordered calls:
//!
//! | Operation | Step 1 | Step 2 | State if step 2 fails |
//! |---|---|---|---|
//! | rename | rack row | products | rack renamed, products may keep old id |
//! | delete | products | rack row | rack exists with no products |
//!
//! Rename goes parent-first and delete goes children-first. Step 1 failing
//! leaves everything untouched; step 2 failing is reported as
//! [`InventoryError::CascadePartial`].

use chrono::Utc;
use tracing::{error, info, instrument};

use rackstock_core::{ProductId, RackId};

use crate::config::InventoryConfig;
use crate::error::{CascadeOperation, InventoryError, InventoryResult, Missing};
use crate::models::{
    NewRack, Product, ProductDraft, ProductPatch, Rack, RackDeletion, RackPatch,
};
use crate::store::{ProductFilter, ProductOrder, RackFilter, Store, StoreBackend, StoreError};

/// Mediates all access to the `racks` and `products` tables.
///
/// # Concurrency
///
/// Each method awaits its store calls one after another. Nothing is locked
/// across calls: two cascades on the same rack, or a product write racing a
/// cascade, can interleave arbitrarily. Failed calls are not retried.
#[derive(Debug, Clone)]
pub struct InventoryService<S> {
    store: S,
    strict_racks: bool,
}

impl InventoryService<StoreBackend> {
    /// Build a service over the backend selected by `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the hosted store client cannot be built.
    pub fn from_config(config: &InventoryConfig) -> InventoryResult<Self> {
        let store = StoreBackend::from_config(config)?;
        Ok(Self::new(store).with_strict_racks(config.strict_racks))
    }
}

impl<S: Store> InventoryService<S> {
    /// Create a new inventory service over `store`.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            strict_racks: false,
        }
    }

    /// Require a product's rack to exist before inserting or moving it.
    #[must_use]
    pub const fn with_strict_racks(mut self, strict: bool) -> Self {
        self.strict_racks = strict;
        self
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Racks
    // =========================================================================

    /// List racks, optionally filtered by a case-insensitive substring of `rack_id`.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the store call fails.
    #[instrument(skip(self))]
    pub async fn get_racks(&self, query: &str) -> InventoryResult<Vec<Rack>> {
        let filter = match query.trim() {
            "" => RackFilter::All,
            q => RackFilter::RackIdContains(q.to_string()),
        };
        Ok(self.store.select_racks(&filter).await?)
    }

    /// Register a new rack.
    ///
    /// # Errors
    ///
    /// Returns `Duplicate` if the identifier is taken, `Transport` otherwise.
    #[instrument(skip(self))]
    pub async fn add_rack(&self, rack_id: RackId) -> InventoryResult<Rack> {
        let rack = NewRack { rack_id };
        let row = self
            .store
            .insert_rack(&rack)
            .await
            .map_err(|e| rack_write_error(e, &rack.rack_id))?;
        info!(rack_id = %row.rack_id, id = %row.id, "Rack added");
        Ok(row)
    }

    /// Rename a rack and re-point its products at the new identifier.
    ///
    /// Renaming to the current identifier writes nothing and returns the rack.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no rack is named `old` (nothing is written)
    /// - `Duplicate` if `new` belongs to another rack (nothing is written)
    /// - `CascadePartial` if the rack was renamed but the product update failed;
    ///   products may still reference `old`, see [`Self::reassign_products`]
    /// - `Transport` if the rack update failed for any other reason
    #[instrument(skip(self))]
    pub async fn rename_rack(&self, old: &RackId, new: &RackId) -> InventoryResult<Rack> {
        if old == new {
            return self.find_rack(old).await;
        }

        let renamed = self
            .store
            .update_racks(
                &RackFilter::RackIdEq(old.clone()),
                &RackPatch {
                    rack_id: new.clone(),
                },
            )
            .await
            .map_err(|e| rack_write_error(e, new))?;
        let Some(rack) = renamed.into_iter().next() else {
            return Err(InventoryError::NotFound(Missing::Rack(old.clone())));
        };

        let moved = self
            .store
            .update_products(
                &ProductFilter::RackIdEq(old.clone()),
                &ProductPatch::move_to(new.clone()),
            )
            .await
            .map_err(|source| {
                error!(
                    from = %old,
                    to = %new,
                    error = %source,
                    "Rack renamed but products still reference the old id"
                );
                InventoryError::CascadePartial {
                    operation: CascadeOperation::Rename,
                    rack_id: old.clone(),
                    source,
                }
            })?;

        info!(from = %old, to = %new, products = moved.len(), "Rack renamed");
        Ok(rack)
    }

    /// Delete a rack after deleting every product stored on it.
    ///
    /// A rack that does not exist is not an error: any products still
    /// carrying the identifier are removed and `rack_removed` is false.
    ///
    /// # Errors
    ///
    /// - `Transport` if deleting the products failed (nothing was removed)
    /// - `CascadePartial` if the products were removed but the rack was not
    #[instrument(skip(self))]
    pub async fn delete_rack(&self, rack_id: &RackId) -> InventoryResult<RackDeletion> {
        let removed = self
            .store
            .delete_products(&ProductFilter::RackIdEq(rack_id.clone()))
            .await?;

        let racks = self
            .store
            .delete_racks(&RackFilter::RackIdEq(rack_id.clone()))
            .await
            .map_err(|source| {
                error!(
                    rack_id = %rack_id,
                    products_removed = removed.len(),
                    error = %source,
                    "Products removed but rack delete failed"
                );
                InventoryError::CascadePartial {
                    operation: CascadeOperation::Delete,
                    rack_id: rack_id.clone(),
                    source,
                }
            })?;

        let deletion = RackDeletion {
            rack_id: rack_id.clone(),
            products_removed: removed.len(),
            rack_removed: !racks.is_empty(),
        };
        info!(
            rack_id = %rack_id,
            products_removed = deletion.products_removed,
            rack_removed = deletion.rack_removed,
            "Rack deleted"
        );
        Ok(deletion)
    }

    /// Move every product on rack `from` to rack `to`.
    ///
    /// This is the second step of [`Self::rename_rack`] on its own, for
    /// finishing a rename that ended in `CascadePartial`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` in strict mode if `to` does not exist, `Transport`
    /// if the store call fails.
    #[instrument(skip(self))]
    pub async fn reassign_products(&self, from: &RackId, to: &RackId) -> InventoryResult<Vec<Product>> {
        self.ensure_rack(to).await?;
        let moved = self
            .store
            .update_products(
                &ProductFilter::RackIdEq(from.clone()),
                &ProductPatch::move_to(to.clone()),
            )
            .await?;
        info!(from = %from, to = %to, products = moved.len(), "Products reassigned");
        Ok(moved)
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Search products by a case-insensitive substring of the name, ordered by name.
    ///
    /// A blank query returns every product.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the store call fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, name_query: &str) -> InventoryResult<Vec<Product>> {
        let filter = match name_query.trim() {
            "" => ProductFilter::All,
            q => ProductFilter::NameContains(q.to_string()),
        };
        Ok(self
            .store
            .select_products(&filter, ProductOrder::NameAsc)
            .await?)
    }

    /// Products stored on exactly `rack_id`.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the store call fails.
    #[instrument(skip(self))]
    pub async fn get_products_by_rack(&self, rack_id: &RackId) -> InventoryResult<Vec<Product>> {
        Ok(self
            .store
            .select_products(
                &ProductFilter::RackIdEq(rack_id.clone()),
                ProductOrder::Unordered,
            )
            .await?)
    }

    /// Products whose barcode is exactly `barcode`.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if the store call fails.
    #[instrument(skip(self))]
    pub async fn get_products_by_barcode(&self, barcode: &str) -> InventoryResult<Vec<Product>> {
        let barcode = barcode.trim();
        if barcode.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .select_products(
                &ProductFilter::BarcodeEq(barcode.to_string()),
                ProductOrder::Unordered,
            )
            .await?)
    }

    /// Fetch one product.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no product has `id`.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: ProductId) -> InventoryResult<Product> {
        self.store
            .select_products(&ProductFilter::IdEq(id), ProductOrder::Unordered)
            .await?
            .into_iter()
            .next()
            .ok_or(InventoryError::NotFound(Missing::Product(id)))
    }

    /// Add a product to a rack.
    ///
    /// The rack's existence is only checked in strict mode.
    ///
    /// # Errors
    ///
    /// - `Invalid` if the name is blank
    /// - `NotFound` in strict mode if the rack does not exist
    /// - `Transport` if the store call fails
    #[instrument(skip(self))]
    pub async fn add_product(&self, draft: ProductDraft) -> InventoryResult<Product> {
        let product = draft.into_new_product(Utc::now())?;
        self.ensure_rack(&product.rack_id).await?;

        let row = self.store.insert_product(&product).await?;
        info!(id = %row.id, rack_id = %row.rack_id, "Product added");
        Ok(row)
    }

    /// Merge `patch` into product `id`; fields not in the patch are unchanged.
    ///
    /// # Errors
    ///
    /// - `Invalid` if a supplied name is blank
    /// - `NotFound` if no product has `id` (or, in strict mode, the target rack is missing)
    /// - `Transport` if the store call fails
    #[instrument(skip(self))]
    pub async fn update_product(&self, id: ProductId, patch: ProductPatch) -> InventoryResult<Product> {
        let patch = patch.normalized()?;
        if patch.is_empty() {
            return self.get_product(id).await;
        }
        if let Some(rack_id) = &patch.rack_id {
            self.ensure_rack(rack_id).await?;
        }

        self.store
            .update_products(&ProductFilter::IdEq(id), &patch)
            .await?
            .into_iter()
            .next()
            .ok_or(InventoryError::NotFound(Missing::Product(id)))
    }

    /// Delete one product, returning the removed row.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no product has `id`, `Transport` if the store call fails.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: ProductId) -> InventoryResult<Product> {
        let removed = self
            .store
            .delete_products(&ProductFilter::IdEq(id))
            .await?
            .into_iter()
            .next()
            .ok_or(InventoryError::NotFound(Missing::Product(id)))?;
        info!(id = %id, "Product deleted");
        Ok(removed)
    }

    /// Verify that the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `Transport` with the store's failure.
    pub async fn check_connection(&self) -> InventoryResult<()> {
        self.store.ping().await?;
        info!(backend = self.store.backend_name(), "Store reachable");
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn find_rack(&self, rack_id: &RackId) -> InventoryResult<Rack> {
        self.store
            .select_racks(&RackFilter::RackIdEq(rack_id.clone()))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| InventoryError::NotFound(Missing::Rack(rack_id.clone())))
    }

    async fn ensure_rack(&self, rack_id: &RackId) -> InventoryResult<()> {
        if self.strict_racks {
            self.find_rack(rack_id).await?;
        }
        Ok(())
    }
}

/// Map a failed rack write, turning a unique violation into `Duplicate`.
fn rack_write_error(err: StoreError, rack_id: &RackId) -> InventoryError {
    match err {
        StoreError::UniqueViolation(_) => InventoryError::Duplicate(rack_id.clone()),
        other => InventoryError::Transport(other),
    }
}
