//! Product domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rackstock_core::{Price, ProductId, RackId};

/// Input rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Product name is empty after trimming.
    #[error("product name cannot be empty")]
    EmptyName,
}

/// An inventory item stored on exactly one rack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Store-assigned row ID.
    pub id: ProductId,
    /// Display name, searched case-insensitively.
    pub product_name: String,
    /// Scanned or typed barcode, if any.
    #[serde(default)]
    pub barcode: Option<String>,
    /// Units on hand.
    #[serde(default)]
    pub qty: u32,
    /// Unit price.
    #[serde(default)]
    pub price: Price,
    /// Natural key of the rack holding this product (denormalized copy).
    pub rack_id: RackId,
    /// When the product was added.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Caller-supplied fields for a new product.
///
/// Defaults mirror the entry form: one unit, no barcode, zero price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub product_name: String,
    pub barcode: Option<String>,
    pub qty: u32,
    pub price: Price,
    pub rack_id: RackId,
}

impl ProductDraft {
    /// Start a draft for `product_name` on `rack_id`.
    #[must_use]
    pub fn new(rack_id: RackId, product_name: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            barcode: None,
            qty: 1,
            price: Price::ZERO,
            rack_id,
        }
    }

    #[must_use]
    pub fn with_barcode(mut self, barcode: impl Into<String>) -> Self {
        self.barcode = Some(barcode.into());
        self
    }

    #[must_use]
    pub const fn with_qty(mut self, qty: u32) -> Self {
        self.qty = qty;
        self
    }

    #[must_use]
    pub const fn with_price(mut self, price: Price) -> Self {
        self.price = price;
        self
    }

    /// Validate and normalize into an insert payload stamped with `created_at`.
    ///
    /// The name is trimmed and must be non-empty; a blank barcode becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if the trimmed name is empty.
    pub fn into_new_product(self, created_at: DateTime<Utc>) -> Result<NewProduct, ValidationError> {
        let product_name = normalize_name(&self.product_name)?;
        Ok(NewProduct {
            product_name,
            barcode: normalize_barcode(self.barcode.as_deref()),
            qty: self.qty,
            price: self.price,
            rack_id: self.rack_id,
            created_at: Some(created_at),
        })
    }
}

/// Insert payload for the `products` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewProduct {
    pub product_name: String,
    pub barcode: Option<String>,
    pub qty: u32,
    pub price: Price,
    pub rack_id: RackId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewProduct {
    /// Materialize the row the store would hold after inserting this payload.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            product_name: self.product_name,
            barcode: self.barcode,
            qty: self.qty,
            price: self.price,
            rack_id: self.rack_id,
            created_at: self.created_at,
        }
    }
}

/// Merge-patch for a product row: only `Some` fields are written.
///
/// `barcode: Some(None)` clears the barcode (serialized as `null`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rack_id: Option<RackId>,
}

impl ProductPatch {
    /// Patch that only re-points products at another rack.
    #[must_use]
    pub fn move_to(rack_id: RackId) -> Self {
        Self {
            rack_id: Some(rack_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = Some(product_name.into());
        self
    }

    #[must_use]
    pub fn with_barcode(mut self, barcode: Option<String>) -> Self {
        self.barcode = Some(barcode);
        self
    }

    #[must_use]
    pub const fn with_qty(mut self, qty: u32) -> Self {
        self.qty = Some(qty);
        self
    }

    #[must_use]
    pub const fn with_price(mut self, price: Price) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn with_rack(mut self, rack_id: RackId) -> Self {
        self.rack_id = Some(rack_id);
        self
    }

    /// True when the patch would not change any column.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.product_name.is_none()
            && self.barcode.is_none()
            && self.qty.is_none()
            && self.price.is_none()
            && self.rack_id.is_none()
    }

    /// Apply the same normalization as [`ProductDraft::into_new_product`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyName`] if a supplied name is blank.
    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        if let Some(name) = self.product_name.take() {
            self.product_name = Some(normalize_name(&name)?);
        }
        if let Some(barcode) = self.barcode.take() {
            self.barcode = Some(normalize_barcode(barcode.as_deref()));
        }
        Ok(self)
    }

    /// Write every supplied field onto `product`.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.product_name {
            product.product_name.clone_from(name);
        }
        if let Some(barcode) = &self.barcode {
            product.barcode.clone_from(barcode);
        }
        if let Some(qty) = self.qty {
            product.qty = qty;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(rack_id) = &self.rack_id {
            product.rack_id.clone_from(rack_id);
        }
    }
}

fn normalize_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_owned())
}

fn normalize_barcode(barcode: Option<&str>) -> Option<String> {
    barcode
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rack(id: &str) -> RackId {
        RackId::parse(id).unwrap()
    }

    fn sample() -> Product {
        Product {
            id: ProductId::new(1),
            product_name: "Wireless Mouse".to_string(),
            barcode: Some("123456789".to_string()),
            qty: 15,
            price: Price::from_units(25),
            rack_id: rack("R1-A"),
            created_at: None,
        }
    }

    #[test]
    fn test_draft_defaults() {
        let draft = ProductDraft::new(rack("R1-A"), "Cable");
        assert_eq!(draft.qty, 1);
        assert_eq!(draft.price, Price::ZERO);
        assert!(draft.barcode.is_none());
    }

    #[test]
    fn test_draft_blank_barcode_becomes_none() {
        let new = ProductDraft::new(rack("R1-A"), "  Cable ")
            .with_barcode("   ")
            .into_new_product(Utc::now())
            .unwrap();
        assert_eq!(new.product_name, "Cable");
        assert!(new.barcode.is_none());
    }

    #[test]
    fn test_draft_empty_name_rejected() {
        let result = ProductDraft::new(rack("R1-A"), " ").into_new_product(Utc::now());
        assert_eq!(result, Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_patch_apply_only_supplied_fields() {
        let mut product = sample();
        ProductPatch::default().with_qty(3).apply_to(&mut product);

        let expected = Product { qty: 3, ..sample() };
        assert_eq!(product, expected);
    }

    #[test]
    fn test_patch_clears_barcode() {
        let mut product = sample();
        let patch = ProductPatch::default()
            .with_barcode(Some("  ".to_string()))
            .normalized()
            .unwrap();
        assert_eq!(patch.barcode, Some(None));

        patch.apply_to(&mut product);
        assert!(product.barcode.is_none());
    }

    #[test]
    fn test_patch_serializes_only_supplied_fields() {
        let json = serde_json::to_value(ProductPatch::default().with_qty(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "qty": 3 }));

        let json = serde_json::to_value(ProductPatch::default().with_barcode(None)).unwrap();
        assert_eq!(json, serde_json::json!({ "barcode": null }));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(ProductPatch::default().is_empty());
        assert!(!ProductPatch::move_to(rack("R9")).is_empty());
    }

    #[test]
    fn test_product_deserializes_store_row() {
        let row = serde_json::json!({
            "id": 3,
            "product_name": "USB-C Cable",
            "barcode": null,
            "qty": 50,
            "price": 10.5,
            "rack_id": "R2-A",
            "created_at": "2026-01-05T10:00:00+00:00"
        });
        let product: Product = serde_json::from_value(row).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert!(product.barcode.is_none());
        assert_eq!(product.price.to_string(), "10.50");
        assert!(product.created_at.is_some());
    }
}
