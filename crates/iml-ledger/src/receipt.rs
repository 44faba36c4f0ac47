use iml_chain::{Block, ChainError};
use iml_types::{AnchorId, LogEntry};

/// What happened to the single anchor attempt for a movement.
///
/// An explicit variant instead of a bare `Option` so callers must look at
/// the degraded case: an unanchored movement succeeded, but its receipt
/// carries the reason anchoring did not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnchorOutcome {
    /// The movement content is pinned under this identifier.
    Anchored(AnchorId),
    /// Anchoring failed; the movement was recorded anyway.
    Unanchored { reason: String },
}

impl AnchorOutcome {
    pub fn is_anchored(&self) -> bool {
        matches!(self, AnchorOutcome::Anchored(_))
    }

    /// The identifier, when anchored.
    pub fn anchor_id(&self) -> Option<&AnchorId> {
        match self {
            AnchorOutcome::Anchored(id) => Some(id),
            AnchorOutcome::Unanchored { .. } => None,
        }
    }

    /// The failure reason, when unanchored.
    pub fn warning(&self) -> Option<&str> {
        match self {
            AnchorOutcome::Anchored(_) => None,
            AnchorOutcome::Unanchored { reason } => Some(reason),
        }
    }
}

/// Everything a successful `record_movement` produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementReceipt {
    /// The durable log entry, anchor id attached when anchoring succeeded.
    pub entry: LogEntry,
    /// The block sealed over this movement.
    pub block: Block,
    /// Outcome of the anchor attempt.
    pub anchor: AnchorOutcome,
}

/// Outcome of a full chain verification scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainReport {
    /// Blocks scanned, genesis included.
    pub length: usize,
    /// The first violation found, if any.
    pub fault: Option<ChainError>,
}

impl ChainReport {
    pub fn is_valid(&self) -> bool {
        self.fault.is_none()
    }

    /// Height of the first failing block, when invalid.
    pub fn failing_index(&self) -> Option<u64> {
        self.fault.as_ref().and_then(ChainError::failing_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_accessors_split_the_variants() {
        let anchored = AnchorOutcome::Anchored(AnchorId::new("QmX"));
        assert!(anchored.is_anchored());
        assert_eq!(anchored.anchor_id(), Some(&AnchorId::new("QmX")));
        assert_eq!(anchored.warning(), None);

        let unanchored = AnchorOutcome::Unanchored {
            reason: "anchor transport error: timeout".to_string(),
        };
        assert!(!unanchored.is_anchored());
        assert_eq!(unanchored.anchor_id(), None);
        assert_eq!(
            unanchored.warning(),
            Some("anchor transport error: timeout")
        );
    }

    #[test]
    fn chain_report_exposes_first_fault() {
        let clean = ChainReport {
            length: 3,
            fault: None,
        };
        assert!(clean.is_valid());
        assert_eq!(clean.failing_index(), None);

        let broken = ChainReport {
            length: 3,
            fault: Some(ChainError::DigestMismatch { index: 2 }),
        };
        assert!(!broken.is_valid());
        assert_eq!(broken.failing_index(), Some(2));
    }
}
