//! Row filters understood by every store backend.
//!
//! Each variant maps to one PostgREST filter (`eq.` or `ilike.*q*`); the
//! in-memory store evaluates them with [`RackFilter::matches`] and
//! [`ProductFilter::matches`].

use rackstock_core::{ProductId, RackId};

use crate::models::{Product, Rack};

/// Which rows of the `racks` table an operation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RackFilter {
    All,
    /// `rack_id = value`
    RackIdEq(RackId),
    /// `rack_id ILIKE %value%`
    RackIdContains(String),
}

impl RackFilter {
    #[must_use]
    pub fn matches(&self, rack: &Rack) -> bool {
        match self {
            Self::All => true,
            Self::RackIdEq(id) => rack.rack_id == *id,
            Self::RackIdContains(q) => contains_ignore_case(rack.rack_id.as_str(), q),
        }
    }
}

/// Which rows of the `products` table an operation targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductFilter {
    All,
    /// `id = value`
    IdEq(ProductId),
    /// `product_name ILIKE %value%`
    NameContains(String),
    /// `rack_id = value`
    RackIdEq(RackId),
    /// `barcode = value`
    BarcodeEq(String),
}

impl ProductFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        match self {
            Self::All => true,
            Self::IdEq(id) => product.id == *id,
            Self::NameContains(q) => contains_ignore_case(&product.product_name, q),
            Self::RackIdEq(id) => product.rack_id == *id,
            Self::BarcodeEq(code) => product.barcode.as_deref() == Some(code.as_str()),
        }
    }
}

/// Result ordering for product selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductOrder {
    /// Whatever order the store returns.
    #[default]
    Unordered,
    /// `ORDER BY product_name ASC`
    NameAsc,
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
