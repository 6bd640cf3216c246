use crate::config::ConsensusConfig;
use crate::consensus::Consensus;
use crate::error::ChainError;
use crate::ledger::Ledger;
use crate::miner::meets_difficulty;

use super::chain::Block;
use super::state::replay_ledger;

/// Checks linkage, heights, merkle roots, proof-of-work and the expected
/// difficulty of a non-genesis block against its parent.
pub fn validate_block_header(
    block: &Block,
    parent: &Block,
    expected_difficulty: u32,
) -> Result<(), ChainError> {
    let header = &block.header;
    let height = parent.header.block_height + 1;

    if header.block_height != height {
        return Err(ChainError::at(
            height,
            format!("block height is {}, expected {}", header.block_height, height),
        ));
    }

    if header.prev_block_hash != parent.header.block_hash {
        return Err(ChainError::at(
            height,
            format!(
                "previous hash {} does not match parent {}",
                header.prev_block_hash, parent.header.block_hash
            ),
        ));
    }

    if header.difficulty != expected_difficulty {
        return Err(ChainError::at(
            height,
            format!(
                "difficulty is {}, retarget rule requires {}",
                header.difficulty, expected_difficulty
            ),
        ));
    }

    let merkleroot = hex::encode(Block::calculate_merkle_root(&block.transactions));
    if header.merkleroot != merkleroot {
        return Err(ChainError::at(
            height,
            format!("merkle root mismatch: expected {}, got {}", merkleroot, header.merkleroot),
        ));
    }

    let hash = header.compute_hash();
    if header.block_hash != hex::encode(hash) {
        return Err(ChainError::at(height, "stored block hash does not match header"));
    }
    if !meets_difficulty(&hash, header.difficulty) {
        return Err(ChainError::at(
            height,
            "block hash does not meet its difficulty target",
        ));
    }

    Ok(())
}

/// Checks each transaction on its own: non-negative amounts, valid
/// signatures, and no timestamps beyond the allowed skew into the future.
pub fn validate_block_transactions(
    block: &Block,
    config: &ConsensusConfig,
    now: u64,
) -> Result<(), ChainError> {
    let height = block.header.block_height;
    let latest_allowed = now
        .min(block.header.timestamp)
        .saturating_add(config.max_time_diff_tx_ms);

    for tx in &block.transactions {
        if tx.amount() < 0 {
            return Err(ChainError::at(
                height,
                format!("transaction {} has negative amount {}", tx.tx_id(), tx.amount()),
            ));
        }

        if tx.is_mint(&config.mint_address) {
            continue;
        }

        if tx.timestamp() > latest_allowed {
            return Err(ChainError::at(
                height,
                format!("transaction {} is dated in the future", tx.tx_id()),
            ));
        }

        tx.verify_signature(&config.mint_address)
            .map_err(|e| ChainError::at(height, format!("transaction {}: {}", tx.tx_id(), e)))?;
    }
    Ok(())
}

/// A non-genesis block carries exactly one mint transaction, placed last,
/// paying exactly the block reward.
pub fn validate_block_reward(block: &Block, config: &ConsensusConfig) -> Result<(), ChainError> {
    let height = block.header.block_height;
    let mints = block
        .transactions
        .iter()
        .filter(|tx| tx.is_mint(&config.mint_address))
        .count();

    match block.transactions.last() {
        Some(reward) if mints == 1 && reward.is_mint(&config.mint_address) => {
            if reward.amount() != config.block_reward {
                return Err(ChainError::at(
                    height,
                    format!(
                        "reward pays {}, block reward is {}",
                        reward.amount(),
                        config.block_reward
                    ),
                ));
            }
            Ok(())
        }
        _ => Err(ChainError::at(
            height,
            format!(
                "block must end with exactly one reward transaction, found {} mint transactions",
                mints
            ),
        )),
    }
}

/// Validates `blocks` as a complete chain and returns the ledger it implies.
///
/// Block 0 must be this network's genesis. Every later block must link to
/// its parent and carry valid proof-of-work at the scheduled difficulty.
/// Every block pays exactly one reward, every transaction is checked, and the chain must replay without nonce
/// gaps or overdrafts. Any failure rejects the whole candidate.
pub fn validate_chain(
    blocks: &[Block],
    config: &ConsensusConfig,
    now: u64,
) -> Result<Ledger, ChainError> {
    let genesis = blocks
        .first()
        .ok_or_else(|| ChainError::at(0, "chain is empty"))?;
    if *genesis != Block::genesis(config) {
        return Err(ChainError::at(0, "genesis block does not match this network"));
    }

    let schedule = Consensus::difficulty_schedule(blocks, config);
    for (i, pair) in blocks.windows(2).enumerate() {
        let (parent, block) = (&pair[0], &pair[1]);
        validate_block_header(block, parent, schedule[i + 1])?;
        validate_block_reward(block, config)?;
        validate_block_transactions(block, config, now)?;
    }

    replay_ledger(blocks, &config.mint_address)
}
