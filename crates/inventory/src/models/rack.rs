//! Rack domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rackstock_core::{RackId, RackRowId};

/// A physical storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rack {
    /// Store-assigned row ID. Never changes, even across renames.
    pub id: RackRowId,
    /// Human-entered identifier, unique across racks.
    pub rack_id: RackId,
    /// When the rack was registered, if the store tracks it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for the `racks` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRack {
    pub rack_id: RackId,
}

/// Update payload for the `racks` table. The natural key is the only mutable column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RackPatch {
    pub rack_id: RackId,
}

/// Outcome of a completed rack delete cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RackDeletion {
    /// The rack identifier that was targeted.
    pub rack_id: RackId,
    /// Number of products removed in the first step.
    pub products_removed: usize,
    /// Whether a rack row existed and was removed in the second step.
    pub rack_removed: bool,
}
