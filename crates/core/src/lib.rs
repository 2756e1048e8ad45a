//! rackstock core - Shared types library.
//!
//! This crate provides the value types used across all rackstock components:
//! - `inventory` - Store adapters and the inventory service
//! - `cli` - Command-line driver, migrations and connectivity checks
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for row IDs, rack identifiers, and prices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
