//! In-memory mock store.
//!
//! Stands in for the hosted store during development. Each call takes the
//! table lock once, so a single call is atomic; a sequence of calls is not.
//! Data lives only as long as the process.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use rackstock_core::{Price, ProductId, RackId, RackRowId};

use super::{ProductFilter, ProductOrder, RackFilter, Store, StoreError, StoreResult};
use crate::models::{NewProduct, NewRack, Product, ProductPatch, Rack, RackPatch};

/// Demo racks loaded by [`MemoryStore::seeded`].
const DEMO_RACKS: &[&str] = &["R1-A", "R1-B", "R2-A", "R2-B"];

/// Demo products loaded by [`MemoryStore::seeded`]: name, barcode, qty, rack, price.
const DEMO_PRODUCTS: &[(&str, &str, u32, &str, u32)] = &[
    ("Wireless Mouse", "123456789", 15, "R1-A", 25),
    ("Mechanical Keyboard", "987654321", 5, "R1-B", 120),
    ("USB-C Cable", "456123789", 50, "R2-A", 10),
    ("Monitor Stand", "789123456", 10, "R2-B", 45),
];

#[derive(Debug, Default)]
struct Tables {
    racks: Vec<Rack>,
    products: Vec<Product>,
    last_rack_id: i64,
    last_product_id: i64,
}

impl Tables {
    fn next_rack_id(&mut self) -> RackRowId {
        self.last_rack_id += 1;
        RackRowId::new(self.last_rack_id)
    }

    fn next_product_id(&mut self) -> ProductId {
        self.last_product_id += 1;
        ProductId::new(self.last_product_id)
    }

    fn demo() -> Self {
        let mut tables = Self::default();

        for code in DEMO_RACKS {
            let Ok(rack_id) = RackId::parse(code) else {
                continue;
            };
            let id = tables.next_rack_id();
            tables.racks.push(Rack {
                id,
                rack_id,
                created_at: None,
            });
        }

        for &(name, barcode, qty, rack, price) in DEMO_PRODUCTS {
            let Ok(rack_id) = RackId::parse(rack) else {
                continue;
            };
            let id = tables.next_product_id();
            tables.products.push(Product {
                id,
                product_name: name.to_string(),
                barcode: Some(barcode.to_string()),
                qty,
                price: Price::from_units(price),
                rack_id,
                created_at: None,
            });
        }

        tables
    }
}

/// In-process store backed by two vectors.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    latency: Duration,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the four demo racks and their products.
    #[must_use]
    pub fn seeded() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables::demo())),
            latency: Duration::ZERO,
        }
    }

    /// Delay every call by `latency` to mimic a network round trip.
    #[must_use]
    pub const fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

fn duplicate_rack(rack_id: &RackId) -> StoreError {
    StoreError::UniqueViolation(format!("Key (rack_id)=({rack_id}) already exists."))
}

impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    #[instrument(level = "debug", skip(self))]
    async fn select_racks(&self, filter: &RackFilter) -> StoreResult<Vec<Rack>> {
        self.round_trip().await;
        let tables = self.tables.read().await;
        Ok(tables
            .racks
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    #[instrument(level = "debug", skip(self))]
    async fn insert_rack(&self, rack: &NewRack) -> StoreResult<Rack> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;

        if tables.racks.iter().any(|r| r.rack_id == rack.rack_id) {
            return Err(duplicate_rack(&rack.rack_id));
        }

        let row = Rack {
            id: tables.next_rack_id(),
            rack_id: rack.rack_id.clone(),
            created_at: Some(Utc::now()),
        };
        tables.racks.push(row.clone());
        debug!(id = %row.id, "Inserted rack");
        Ok(row)
    }

    #[instrument(level = "debug", skip(self))]
    async fn update_racks(&self, filter: &RackFilter, patch: &RackPatch) -> StoreResult<Vec<Rack>> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;

        let targets: Vec<usize> = tables
            .racks
            .iter()
            .enumerate()
            .filter(|(_, r)| filter.matches(r))
            .map(|(i, _)| i)
            .collect();

        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let collides_with_other = tables
            .racks
            .iter()
            .enumerate()
            .any(|(i, r)| r.rack_id == patch.rack_id && !targets.contains(&i));
        if collides_with_other || targets.len() > 1 {
            return Err(duplicate_rack(&patch.rack_id));
        }

        let mut updated = Vec::with_capacity(targets.len());
        for i in targets {
            if let Some(rack) = tables.racks.get_mut(i) {
                rack.rack_id.clone_from(&patch.rack_id);
                updated.push(rack.clone());
            }
        }
        Ok(updated)
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_racks(&self, filter: &RackFilter) -> StoreResult<Vec<Rack>> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut tables.racks)
            .into_iter()
            .partition(|r| filter.matches(r));
        tables.racks = kept;
        Ok(removed)
    }

    #[instrument(level = "debug", skip(self))]
    async fn select_products(
        &self,
        filter: &ProductFilter,
        order: ProductOrder,
    ) -> StoreResult<Vec<Product>> {
        self.round_trip().await;
        let tables = self.tables.read().await;
        let mut rows: Vec<Product> = tables
            .products
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();

        if order == ProductOrder::NameAsc {
            rows.sort_by(|a, b| {
                a.product_name
                    .to_lowercase()
                    .cmp(&b.product_name.to_lowercase())
                    .then_with(|| a.id.cmp(&b.id))
            });
        }
        Ok(rows)
    }

    #[instrument(level = "debug", skip(self))]
    async fn insert_product(&self, product: &NewProduct) -> StoreResult<Product> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;

        let mut payload = product.clone();
        payload.created_at.get_or_insert_with(Utc::now);
        let id = tables.next_product_id();
        let row = payload.into_product(id);
        tables.products.push(row.clone());
        debug!(id = %row.id, "Inserted product");
        Ok(row)
    }

    #[instrument(level = "debug", skip(self))]
    async fn update_products(
        &self,
        filter: &ProductFilter,
        patch: &ProductPatch,
    ) -> StoreResult<Vec<Product>> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();
        for product in tables.products.iter_mut().filter(|p| filter.matches(p)) {
            patch.apply_to(product);
            updated.push(product.clone());
        }
        Ok(updated)
    }

    #[instrument(level = "debug", skip(self))]
    async fn delete_products(&self, filter: &ProductFilter) -> StoreResult<Vec<Product>> {
        self.round_trip().await;
        let mut tables = self.tables.write().await;
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut tables.products)
            .into_iter()
            .partition(|p| filter.matches(p));
        tables.products = kept;
        Ok(removed)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rack(id: &str) -> RackId {
        RackId::parse(id).unwrap()
    }

    #[tokio::test]
    async fn test_seeded_contents() {
        let store = MemoryStore::seeded();
        let racks = store.select_racks(&RackFilter::All).await.unwrap();
        let products = store
            .select_products(&ProductFilter::All, ProductOrder::Unordered)
            .await
            .unwrap();

        assert_eq!(racks.len(), 4);
        assert_eq!(products.len(), 4);
        let first = products.first().unwrap();
        assert_eq!(first.product_name, "Wireless Mouse");
        assert_eq!(first.id, ProductId::new(1));
    }

    #[tokio::test]
    async fn test_new_ids_do_not_collide_with_seed() {
        let store = MemoryStore::seeded();
        let rack_row = store
            .insert_rack(&NewRack { rack_id: rack("R3-A") })
            .await
            .unwrap();
        assert_eq!(rack_row.id, RackRowId::new(5));

        let product = store
            .insert_product(&NewProduct {
                product_name: "Desk Lamp".to_string(),
                barcode: None,
                qty: 2,
                price: Price::from_units(30),
                rack_id: rack("R3-A"),
                created_at: None,
            })
            .await
            .unwrap();
        assert_eq!(product.id, ProductId::new(5));
        assert!(product.created_at.is_some());
    }

    #[tokio::test]
    async fn test_insert_duplicate_rack() {
        let store = MemoryStore::seeded();
        let err = store
            .insert_rack(&NewRack { rack_id: rack("R1-A") })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));
    }

    #[tokio::test]
    async fn test_update_rack_into_existing_id_rejected() {
        let store = MemoryStore::seeded();
        let err = store
            .update_racks(
                &RackFilter::RackIdEq(rack("R1-A")),
                &RackPatch { rack_id: rack("R1-B") },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation(_)));

        let still_there = store
            .select_racks(&RackFilter::RackIdEq(rack("R1-A")))
            .await
            .unwrap();
        assert_eq!(still_there.len(), 1);
    }

    #[tokio::test]
    async fn test_update_rack_to_same_value_allowed() {
        let store = MemoryStore::seeded();
        let updated = store
            .update_racks(
                &RackFilter::RackIdEq(rack("R1-A")),
                &RackPatch { rack_id: rack("R1-A") },
            )
            .await
            .unwrap();
        assert_eq!(updated.len(), 1);
    }

    #[tokio::test]
    async fn test_name_order_is_case_insensitive() {
        let store = MemoryStore::new();
        for name in ["banana", "Apple", "cherry"] {
            store
                .insert_product(&NewProduct {
                    product_name: name.to_string(),
                    barcode: None,
                    qty: 1,
                    price: Price::ZERO,
                    rack_id: rack("R1"),
                    created_at: None,
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = store
            .select_products(&ProductFilter::All, ProductOrder::NameAsc)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.product_name)
            .collect();
        assert_eq!(names, ["Apple", "banana", "cherry"]);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_rows() {
        let store = MemoryStore::seeded();
        let removed = store
            .delete_products(&ProductFilter::RackIdEq(rack("R1-A")))
            .await
            .unwrap();
        assert_eq!(removed.len(), 1);

        let again = store
            .delete_products(&ProductFilter::RackIdEq(rack("R1-A")))
            .await
            .unwrap();
        assert!(again.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_is_applied() {
        let store = MemoryStore::new().with_latency(Duration::from_millis(500));
        let started = tokio::time::Instant::now();
        store.ping().await.unwrap();
        store.select_racks(&RackFilter::All).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(500));
    }
}
