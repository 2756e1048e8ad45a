//! Core types for rackstock.
//!
//! This module provides type-safe wrappers for the inventory domain.

pub mod id;
pub mod price;
pub mod rack_id;

pub use id::*;
pub use price::{Price, PriceError};
pub use rack_id::{RackId, RackIdError};
