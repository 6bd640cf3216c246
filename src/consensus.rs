//! Consensus rules: difficulty retargeting and fork choice.

use crate::blockchain::Block;
use crate::config::ConsensusConfig;
use std::cmp::Ordering;

/// Consensus engine for retargeting and selecting the canonical chain
pub struct Consensus;

impl Consensus {
    /// Difficulty for the block that will follow `blocks`.
    ///
    /// Compares the time between the last block and the one `block_window`
    /// positions from the end against `block_time_diff_ms`, and moves
    /// `current` by exactly one step toward the target cadence.
    pub fn next_difficulty(blocks: &[Block], current: u32, config: &ConsensusConfig) -> u32 {
        if blocks.len() < config.block_window {
            return current;
        }

        let window_start = &blocks[blocks.len() - config.block_window].header;
        let window_end = &blocks[blocks.len() - 1].header;
        let elapsed = window_end.timestamp.saturating_sub(window_start.timestamp);

        let next = match elapsed.cmp(&config.block_time_diff_ms) {
            Ordering::Less => current.saturating_add(1),
            Ordering::Greater => current.saturating_sub(1),
            Ordering::Equal => current,
        };
        next.clamp(config.min_difficulty, config.max_difficulty)
    }

    /// Difficulty each block of `blocks` must carry, followed by the
    /// difficulty of the next block to be mined on top of them.
    pub fn difficulty_schedule(blocks: &[Block], config: &ConsensusConfig) -> Vec<u32> {
        let mut schedule = Vec::with_capacity(blocks.len() + 1);
        let mut difficulty = config.min_difficulty;
        schedule.push(difficulty);
        for end in 1..=blocks.len() {
            difficulty = Self::next_difficulty(&blocks[..end], difficulty, config);
            schedule.push(difficulty);
        }
        schedule
    }

    /// Longest chain wins; ties keep the local chain.
    pub fn prefers_remote(local_len: usize, remote_len: usize) -> bool {
        remote_len > local_len
    }
}
