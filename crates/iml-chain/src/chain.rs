use iml_types::MovementRecord;

use crate::block::Block;
use crate::error::ChainError;

/// An append-only chain of movement blocks.
///
/// The chain always starts at the fixed genesis block and grows one block
/// per recorded movement. Nothing in here prevents a caller from holding a
/// tampered copy; integrity is established by [`HashChain::verify`], which
/// re-checks every block from genesis to tip on each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashChain {
    blocks: Vec<Block>,
}

impl HashChain {
    /// A fresh chain containing only the genesis block.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    /// Rebuilds a chain from previously stored blocks.
    ///
    /// Performs no integrity checking beyond refusing an empty list, so a
    /// tampered history can still be loaded and inspected. Callers decide
    /// when to run [`HashChain::verify`].
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, ChainError> {
        if blocks.is_empty() {
            return Err(ChainError::Empty);
        }
        Ok(Self { blocks })
    }

    /// Seals a new block over `payload` and appends it to the tip.
    ///
    /// Returns the sealed block. Infallible because the block is built
    /// against the current tip and cannot violate the chain shape.
    pub fn append(&mut self, payload: MovementRecord) -> &Block {
        let block = Block::next(self.latest(), payload);
        self.blocks.push(block);
        self.latest()
    }

    /// Appends a block that was sealed outside the chain.
    ///
    /// Used by the journal-first write path, where a block is made durable
    /// on disk before it becomes visible in memory. The block must extend
    /// the current tip exactly.
    pub fn push(&mut self, block: Block) -> Result<(), ChainError> {
        let expected = self.blocks.len() as u64;
        if block.index != expected {
            return Err(ChainError::NonSequentialAppend {
                expected,
                found: block.index,
            });
        }
        if block.previous_hash != self.latest().hash {
            return Err(ChainError::BrokenLink { index: block.index });
        }
        if !block.digest_ok() {
            return Err(ChainError::DigestMismatch { index: block.index });
        }
        self.blocks.push(block);
        Ok(())
    }

    /// Full integrity scan from genesis to tip.
    ///
    /// Re-checks, for every block: the stored index matches the height, the
    /// previous-hash field matches the prior block's digest, and the stored
    /// digest matches a recomputation over the block's fields. Returns the
    /// first violation found, so the error names the lowest bad height.
    pub fn verify(&self) -> Result<(), ChainError> {
        if self.blocks[0] != Block::genesis() {
            return Err(ChainError::GenesisMismatch);
        }
        for height in 1..self.blocks.len() {
            let block = &self.blocks[height];
            let expected = height as u64;
            if block.index != expected {
                return Err(ChainError::IndexMismatch {
                    expected,
                    found: block.index,
                });
            }
            if block.previous_hash != self.blocks[height - 1].hash {
                return Err(ChainError::BrokenLink { index: expected });
            }
            if !block.digest_ok() {
                return Err(ChainError::DigestMismatch { index: expected });
            }
        }
        Ok(())
    }

    /// True when [`HashChain::verify`] reports no violation.
    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// Number of blocks, genesis included. Never zero.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// The most recently appended block.
    pub fn latest(&self) -> &Block {
        self.blocks.last().expect("chain always holds genesis")
    }

    /// Block at the given height, if present.
    pub fn get(&self, index: u64) -> Option<&Block> {
        self.blocks.get(index as usize)
    }

    /// All blocks in append order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}

impl Default for HashChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iml_types::{MovementKind, ProductId};
    use proptest::prelude::*;

    fn import(product: u64, amount: u64) -> MovementRecord {
        MovementRecord::new(MovementKind::Import, ProductId::new(product), amount)
    }

    fn export(product: u64, amount: u64) -> MovementRecord {
        MovementRecord::new(MovementKind::Export, ProductId::new(product), amount)
    }

    fn chain_of(payloads: &[MovementRecord]) -> HashChain {
        let mut chain = HashChain::new();
        for payload in payloads {
            chain.append(payload.clone());
        }
        chain
    }

    #[test]
    fn new_chain_is_genesis_only_and_valid() {
        let chain = HashChain::new();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.latest(), &Block::genesis());
        assert!(chain.is_valid());
    }

    #[test]
    fn append_links_blocks_in_order() {
        let chain = chain_of(&[import(42, 10), export(42, 3), import(7, 1)]);

        assert_eq!(chain.len(), 4);
        for height in 0..chain.len() {
            assert_eq!(chain.blocks()[height].index, height as u64);
        }
        for height in 1..chain.len() {
            assert_eq!(
                chain.blocks()[height].previous_hash,
                chain.blocks()[height - 1].hash
            );
        }
        assert!(chain.verify().is_ok());
    }

    #[test]
    fn five_appends_make_six_blocks() {
        let chain = chain_of(&[
            import(1, 10),
            import(2, 5),
            export(1, 4),
            export(2, 5),
            import(1, 2),
        ]);
        assert_eq!(chain.len(), 6);
        assert!(chain.is_valid());
    }

    #[test]
    fn verify_reports_tampered_payload() {
        let mut chain = chain_of(&[import(42, 10), export(42, 3)]);
        chain.blocks[1].payload.amount = 999;

        assert_eq!(chain.verify(), Err(ChainError::DigestMismatch { index: 1 }));
        assert!(!chain.is_valid());
    }

    #[test]
    fn verify_reports_relinked_suffix() {
        let mut chain = chain_of(&[import(42, 10), export(42, 3), import(42, 1)]);
        // Rewrite block 1 and fix its own digest; block 2 still points at the
        // old digest, so the break surfaces one link later.
        chain.blocks[1].payload.amount = 999;
        chain.blocks[1].hash = chain.blocks[1].expected_digest();

        assert_eq!(chain.verify(), Err(ChainError::BrokenLink { index: 2 }));
    }

    #[test]
    fn verify_reports_tampered_genesis() {
        let mut chain = chain_of(&[import(1, 1)]);
        chain.blocks[0].payload.amount = 5;

        assert_eq!(chain.verify(), Err(ChainError::GenesisMismatch));
    }

    #[test]
    fn verify_reports_index_rewrite() {
        let mut chain = chain_of(&[import(1, 1), import(1, 2), import(1, 3)]);
        chain.blocks[2].index = 9;

        assert_eq!(
            chain.verify(),
            Err(ChainError::IndexMismatch {
                expected: 2,
                found: 9
            })
        );
    }

    #[test]
    fn verify_reports_first_bad_height() {
        let mut chain = chain_of(&[import(1, 1), import(1, 2), import(1, 3)]);
        chain.blocks[1].payload.amount = 100;
        chain.blocks[3].payload.amount = 100;

        let err = chain.verify().unwrap_err();
        assert_eq!(err.failing_index(), Some(1));
    }

    #[test]
    fn push_accepts_externally_sealed_block() {
        let mut chain = HashChain::new();
        let block = Block::next(chain.latest(), import(5, 20));

        chain.push(block.clone()).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.latest(), &block);
        assert!(chain.is_valid());
    }

    #[test]
    fn push_rejects_stale_tip() {
        let mut chain = HashChain::new();
        let stale = Block::next(chain.latest(), import(5, 20));
        chain.append(import(9, 1));

        assert_eq!(
            chain.push(stale),
            Err(ChainError::NonSequentialAppend {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn push_rejects_resealed_digest() {
        let mut chain = HashChain::new();
        let mut block = Block::next(chain.latest(), import(5, 20));
        block.payload.amount = 25;

        assert_eq!(
            chain.push(block),
            Err(ChainError::DigestMismatch { index: 1 })
        );
    }

    #[test]
    fn from_blocks_rejects_empty_and_round_trips() {
        assert_eq!(
            HashChain::from_blocks(Vec::new()).unwrap_err(),
            ChainError::Empty
        );

        let original = chain_of(&[import(42, 10), export(42, 3)]);
        let restored = HashChain::from_blocks(original.blocks().to_vec()).unwrap();
        assert_eq!(restored, original);
        assert!(restored.is_valid());
    }

    proptest! {
        #[test]
        fn any_append_sequence_verifies(
            moves in proptest::collection::vec((any::<bool>(), 0u64..100, 1u64..1_000), 0..32)
        ) {
            let mut chain = HashChain::new();
            for (is_export, product, amount) in moves {
                let payload = if is_export {
                    export(product, amount)
                } else {
                    import(product, amount)
                };
                chain.append(payload);
            }
            prop_assert!(chain.verify().is_ok());
        }

        #[test]
        fn tampering_any_amount_is_detected(
            len in 1usize..16,
            victim in 0usize..16,
        ) {
            let victim = victim % len;
            let mut chain = HashChain::new();
            for i in 0..len {
                chain.append(import(i as u64, 10));
            }
            // Offset keeps the amount different from the original.
            chain.blocks[victim + 1].payload.amount += 1;

            let err = chain.verify().unwrap_err();
            prop_assert_eq!(err.failing_index(), Some(victim as u64 + 1));
        }
    }
}
