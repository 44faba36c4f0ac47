use thiserror::Error;

/// Violations reported by chain verification and live appends.
///
/// Every variant except [`ChainError::Empty`] names the block height the
/// check failed at, so callers can report the first bad index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A block list without even a genesis block cannot form a chain.
    #[error("chain has no blocks")]
    Empty,

    /// Block 0 does not equal the fixed genesis block.
    #[error("genesis block does not match the fixed genesis")]
    GenesisMismatch,

    /// A block's stored index does not match its position in the chain.
    #[error("block at height {expected} claims index {found}")]
    IndexMismatch { expected: u64, found: u64 },

    /// A block's previous hash does not match the digest of the prior block.
    #[error("broken link at index {index}: previous hash does not match prior block")]
    BrokenLink { index: u64 },

    /// A block's stored digest does not match a recomputation over its fields.
    #[error("digest mismatch at index {index}")]
    DigestMismatch { index: u64 },

    /// An appended block does not extend the current tip.
    #[error("non-sequential append: expected index {expected}, block has {found}")]
    NonSequentialAppend { expected: u64, found: u64 },
}

impl ChainError {
    /// Height of the offending block, when the violation names one.
    pub fn failing_index(&self) -> Option<u64> {
        match self {
            ChainError::Empty => None,
            ChainError::GenesisMismatch => Some(0),
            ChainError::IndexMismatch { expected, .. } => Some(*expected),
            ChainError::BrokenLink { index } => Some(*index),
            ChainError::DigestMismatch { index } => Some(*index),
            ChainError::NonSequentialAppend { expected, .. } => Some(*expected),
        }
    }
}

/// Failures while reading or writing the on-disk block journal.
#[derive(Debug, Error)]
pub enum JournalError {
    /// Underlying filesystem failure.
    #[error("journal io error: {0}")]
    Io(#[from] std::io::Error),

    /// A block failed to encode or decode.
    #[error("journal codec error: {0}")]
    Codec(String),

    /// A complete frame failed its CRC check or carried an impossible header.
    ///
    /// Unlike a torn tail, a corrupt interior frame means the file was
    /// altered after it was written. Loading stops with an error instead of
    /// silently dropping the frame.
    #[error("corrupt journal frame at offset {offset}")]
    CorruptFrame { offset: u64 },
}
