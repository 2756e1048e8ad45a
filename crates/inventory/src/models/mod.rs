//! Domain models for racks and products.
//!
//! These are the row shapes exchanged with the store, plus the insert and
//! patch payloads the inventory service builds from caller input.

pub mod product;
pub mod rack;

pub use product::{NewProduct, Product, ProductDraft, ProductPatch, ValidationError};
pub use rack::{NewRack, Rack, RackDeletion, RackPatch};
