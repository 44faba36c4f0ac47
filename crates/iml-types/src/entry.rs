use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::movement::{AnchorId, MovementKind, MovementRecord, ProductId};

/// Unique identifier for a transaction log entry (UUID v7 for time-ordering).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(uuid::Uuid);

impl EntryId {
    /// Generate a new time-ordered entry ID (UUID v7).
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.short_id())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Durable record of one inventory movement, independent of the hash chain.
///
/// A LogEntry is created before the anchor attempt and persists whether or
/// not anchoring (or the subsequent chain append) succeeded, so a movement's
/// effect is never lost to an anchoring outage. It is updated at most once,
/// to attach `anchor_id` after a successful anchor response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: EntryId,
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub product_id: ProductId,
    pub amount: u64,
    pub anchor_id: Option<AnchorId>,
    pub created_at: DateTime<Utc>,
}

impl LogEntry {
    /// Create a fresh, unanchored entry stamped with the current time.
    pub fn new(kind: MovementKind, product_id: ProductId, amount: u64) -> Self {
        Self {
            id: EntryId::new(),
            kind,
            product_id,
            amount,
            anchor_id: None,
            created_at: Utc::now(),
        }
    }

    /// The movement record this entry describes, carrying whatever anchor
    /// identifier the entry holds at this point.
    pub fn record(&self) -> MovementRecord {
        MovementRecord {
            kind: self.kind,
            product_id: self.product_id,
            amount: self.amount,
            anchor_id: self.anchor_id.clone(),
        }
    }

    /// Returns `true` if the entry was successfully anchored.
    pub fn is_anchored(&self) -> bool {
        self.anchor_id.is_some()
    }
}
