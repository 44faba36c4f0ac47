use chrono::{DateTime, SecondsFormat, Utc};
use iml_types::{BlockDigest, MovementKind, MovementRecord, ProductId};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Domain tag mixed into every block digest so block hashes cannot collide
/// with other SHA-256 uses of the same fields.
const BLOCK_DOMAIN_TAG: &[u8] = b"iml-block-v1:";

/// One link in the movement chain.
///
/// A block binds a single [`MovementRecord`] to a position in the chain:
/// `hash` commits to the index, the timestamp, the payload, and the digest
/// of the preceding block. Mutating any stored field changes the expected
/// digest, which full verification reports by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Zero-based height of this block.
    pub index: u64,
    /// Wall-clock time the block was sealed.
    pub timestamp: DateTime<Utc>,
    /// The movement this block records.
    pub payload: MovementRecord,
    /// Digest of the preceding block, or the zero digest for genesis.
    pub previous_hash: BlockDigest,
    /// Digest over this block's own fields.
    pub hash: BlockDigest,
}

impl Block {
    /// The fixed first block of every chain.
    ///
    /// Genesis is fully deterministic: zero previous digest, the Unix epoch
    /// timestamp, and a zero-amount import of product 0. No real movement
    /// produces this payload because zero amounts are rejected upstream.
    pub fn genesis() -> Self {
        let payload = MovementRecord::new(MovementKind::Import, ProductId::new(0), 0);
        Self::seal(0, DateTime::UNIX_EPOCH, payload, BlockDigest::zero())
    }

    /// Seals the successor of `previous`, stamped with the current time.
    pub fn next(previous: &Block, payload: MovementRecord) -> Self {
        Self::seal(previous.index + 1, Utc::now(), payload, previous.hash)
    }

    fn seal(
        index: u64,
        timestamp: DateTime<Utc>,
        payload: MovementRecord,
        previous_hash: BlockDigest,
    ) -> Self {
        let hash = digest_fields(index, &timestamp, &payload, &previous_hash);
        Self {
            index,
            timestamp,
            payload,
            previous_hash,
            hash,
        }
    }

    /// Recomputes the digest from the stored fields.
    pub fn expected_digest(&self) -> BlockDigest {
        digest_fields(self.index, &self.timestamp, &self.payload, &self.previous_hash)
    }

    /// True when the stored digest matches a recomputation.
    pub fn digest_ok(&self) -> bool {
        self.hash == self.expected_digest()
    }
}

/// Computes a block digest over a fixed field order.
///
/// SHA-256 input: the domain tag, the index as little-endian bytes, the
/// previous digest bytes, the RFC 3339 timestamp at nanosecond precision,
/// then the payload fields (kind string, product id and amount as
/// little-endian bytes, and the anchor id behind a one-byte presence
/// marker). Fixed-width integers keep the concatenation unambiguous.
fn digest_fields(
    index: u64,
    timestamp: &DateTime<Utc>,
    payload: &MovementRecord,
    previous_hash: &BlockDigest,
) -> BlockDigest {
    let mut hasher = Sha256::new();
    hasher.update(BLOCK_DOMAIN_TAG);
    hasher.update(index.to_le_bytes());
    hasher.update(previous_hash.as_bytes());
    hasher.update(
        timestamp
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
            .as_bytes(),
    );
    hasher.update(payload.kind.as_str().as_bytes());
    hasher.update(payload.product_id.value().to_le_bytes());
    hasher.update(payload.amount.to_le_bytes());
    match &payload.anchor_id {
        Some(anchor) => {
            hasher.update([1u8]);
            hasher.update(anchor.as_str().as_bytes());
        }
        None => hasher.update([0u8]),
    }
    BlockDigest::from_hash(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use iml_types::AnchorId;

    #[test]
    fn genesis_is_deterministic() {
        let a = Block::genesis();
        let b = Block::genesis();
        assert_eq!(a, b);
        assert_eq!(a.index, 0);
        assert!(a.previous_hash.is_zero());
        assert_eq!(a.timestamp, DateTime::UNIX_EPOCH);
        assert_eq!(a.payload.amount, 0);
        assert!(a.digest_ok());
    }

    #[test]
    fn next_links_to_previous() {
        let genesis = Block::genesis();
        let payload = MovementRecord::new(MovementKind::Import, ProductId::new(7), 10);
        let block = Block::next(&genesis, payload);

        assert_eq!(block.index, 1);
        assert_eq!(block.previous_hash, genesis.hash);
        assert!(block.digest_ok());
    }

    #[test]
    fn digest_covers_every_field() {
        let genesis = Block::genesis();
        let payload = MovementRecord::new(MovementKind::Export, ProductId::new(7), 3)
            .with_anchor(AnchorId::new("QmTest"));
        let block = Block::next(&genesis, payload);

        let mut tampered = block.clone();
        tampered.payload.amount = 4;
        assert!(!tampered.digest_ok());

        let mut tampered = block.clone();
        tampered.index = 2;
        assert!(!tampered.digest_ok());

        let mut tampered = block.clone();
        tampered.timestamp = DateTime::UNIX_EPOCH;
        assert!(!tampered.digest_ok());

        let mut tampered = block.clone();
        tampered.previous_hash = BlockDigest::zero();
        assert!(!tampered.digest_ok());

        let mut tampered = block.clone();
        tampered.payload.anchor_id = None;
        assert!(!tampered.digest_ok());
    }

    #[test]
    fn anchor_presence_changes_digest() {
        let genesis = Block::genesis();
        let bare = MovementRecord::new(MovementKind::Import, ProductId::new(1), 5);
        let anchored = bare.clone().with_anchor(AnchorId::new("QmAnchor"));

        let a = digest_fields(1, &genesis.timestamp, &bare, &genesis.hash);
        let b = digest_fields(1, &genesis.timestamp, &anchored, &genesis.hash);
        assert_ne!(a, b);
    }

    #[test]
    fn serde_round_trip_preserves_digest() {
        let genesis = Block::genesis();
        let payload = MovementRecord::new(MovementKind::Export, ProductId::new(42), 3);
        let block = Block::next(&genesis, payload);

        let json = serde_json::to_string(&block).unwrap();
        let restored: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, block);
        assert!(restored.digest_ok());
    }
}
