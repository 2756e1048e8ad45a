//! Rackstock inventory library.
//!
//! Tracks which products sit on which storage rack. Racks are identified by
//! a short natural key (`R1-A`), products carry that key, and
//! [`InventoryService`] keeps the two in step when a rack is renamed or
//! deleted.
//!
//! Data lives either in a hosted PostgREST database or in an in-memory mock,
//! chosen at startup from the environment (see [`config`]).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use config::{ConfigError, InventoryConfig};
pub use error::{CascadeOperation, InventoryError, InventoryResult, Missing};
pub use models::{Product, ProductDraft, ProductPatch, Rack, RackDeletion};
pub use service::InventoryService;
pub use store::{MemoryStore, PostgRestStore, Store, StoreBackend, StoreError};
