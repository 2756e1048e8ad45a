//! Unified error handling for the inventory service.

use std::fmt;

use thiserror::Error;

use rackstock_core::{ProductId, RackId};

use crate::models::ValidationError;
use crate::store::StoreError;

/// The record an operation expected to find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    Product(ProductId),
    Rack(RackId),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Product(id) => write!(f, "product {id}"),
            Self::Rack(id) => write!(f, "rack {id}"),
        }
    }
}

/// Which rack cascade was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOperation {
    /// Rack row renamed; product references not (or not all) rewritten.
    Rename,
    /// Products removed; rack row not removed.
    Delete,
}

impl fmt::Display for CascadeOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename => write!(f, "rename"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Errors returned by [`crate::InventoryService`].
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Update or delete target does not exist.
    #[error("Not found: {0}")]
    NotFound(Missing),

    /// Another rack already uses this identifier.
    #[error("Rack already exists: {0}")]
    Duplicate(RackId),

    /// The first step of a rack cascade succeeded and the second failed.
    ///
    /// For [`CascadeOperation::Rename`] the rack carries its new id while some
    /// products may still reference the old one. For
    /// [`CascadeOperation::Delete`] the rack still exists with no products.
    #[error("Rack {operation} cascade for {rack_id} partially applied: {source}")]
    CascadePartial {
        operation: CascadeOperation,
        rack_id: RackId,
        #[source]
        source: StoreError,
    },

    /// Input rejected before reaching the store.
    #[error("Invalid input: {0}")]
    Invalid(#[from] ValidationError),

    /// Any other store failure.
    #[error("Store error: {0}")]
    Transport(#[from] StoreError),
}

impl InventoryError {
    /// True when the store was left between the two steps of a rack cascade.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::CascadePartial { .. })
    }
}

/// Result alias for inventory operations.
pub type InventoryResult<T> = Result<T, InventoryError>;
