//! Proof-of-work mining
//!
//! Difficulty `d` means the header hash, read as a big-endian 256-bit
//! integer, must not exceed a target whose first `d` bits are zero and whose
//! remaining bits are one. In other words: at least `d` leading zero bits.

use crate::blockchain::{Block, Sha256Hash};
use crate::error::MiningError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// How many nonces are tried between two cancellation checks.
const CANCEL_POLL_INTERVAL: u64 = 1024;

/// Shared flag telling an in-flight search that its parent is obsolete.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub fn hash_to_target(difficulty: u32) -> Sha256Hash {
    let mut target = [0xFF; 32];
    let leading_zeros = difficulty / 8;
    let partial_bits = difficulty % 8;

    for item in target.iter_mut().take(leading_zeros as usize) {
        *item = 0;
    }

    if leading_zeros < 32 && partial_bits > 0 {
        target[leading_zeros as usize] = 0xFF >> partial_bits;
    }
    target
}

pub fn meets_difficulty(hash: &Sha256Hash, difficulty: u32) -> bool {
    // Byte-wise comparison of big-endian arrays is numeric comparison.
    *hash <= hash_to_target(difficulty)
}

/// Computes the merkle root, then searches nonces `0..max_attempts` for the
/// first header hash that meets the block's difficulty.
pub fn finalize_header(
    block: &mut Block,
    max_attempts: u64,
    cancel: &CancelToken,
) -> Result<(), MiningError> {
    block.header.merkleroot = hex::encode(Block::calculate_merkle_root(&block.transactions));
    let target = hash_to_target(block.header.difficulty);

    for nonce in 0..max_attempts {
        if nonce % CANCEL_POLL_INTERVAL == 0 && cancel.is_cancelled() {
            return Err(MiningError::Cancelled);
        }

        block.header.nonce = nonce;
        let hash = block.header.compute_hash();
        if hash <= target {
            block.header.block_hash = hex::encode(hash);
            debug!(
                "Found nonce {} for height {} at difficulty {}",
                nonce, block.header.block_height, block.header.difficulty
            );
            return Ok(());
        }
    }

    Err(MiningError::Exhausted {
        attempts: max_attempts,
    })
}

/// A candidate block snapshotted under the chain lock, ready to be solved
/// without holding it.
#[derive(Debug, Clone)]
pub struct MiningJob {
    pub(crate) block: Block,
    /// Number of pool transactions (from the front) the candidate includes.
    pub(crate) included: usize,
    pub(crate) max_attempts: u64,
    pub(crate) cancel: CancelToken,
}

impl MiningJob {
    pub fn block(&self) -> &Block {
        &self.block
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn solve(mut self) -> Result<MinedBlock, MiningError> {
        finalize_header(&mut self.block, self.max_attempts, &self.cancel)?;
        Ok(MinedBlock {
            block: self.block,
            included: self.included,
        })
    }
}

/// A sealed block waiting to be committed to the chain it was mined on.
#[derive(Debug, Clone)]
pub struct MinedBlock {
    pub(crate) block: Block,
    pub(crate) included: usize,
}

impl MinedBlock {
    pub fn block(&self) -> &Block {
        &self.block
    }
}
