//! Shared node handle
//!
//! One `Blockchain` sits behind one lock. Admission, sync, and block commits
//! take the write lock; queries take the read lock. Proof-of-work runs on a
//! blocking worker with no lock held, and a block whose parent moved while it
//! was being solved is discarded at commit time.

use crate::blockchain::{Block, Blockchain};
use crate::config::ConsensusConfig;
use crate::error::{AdmissionError, ChainError, ConfigError, MiningError};
use crate::ledger::AccountState;
use crate::transaction::Transaction;
use crate::Amount;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct Node {
    blockchain: Arc<RwLock<Blockchain>>,
}

impl Node {
    pub fn new(config: ConsensusConfig) -> Result<Self, ConfigError> {
        let blockchain = Blockchain::new(config)?;
        Ok(Self {
            blockchain: Arc::new(RwLock::new(blockchain)),
        })
    }

    pub fn submit_transaction(&self, tx: Transaction) -> Result<Transaction, AdmissionError> {
        self.blockchain.write().submit_transaction(tx)
    }

    /// Mines one block on top of the current tip.
    ///
    /// The candidate is assembled under the read lock, solved on a blocking
    /// thread, then committed under the write lock. If the tip moved in the
    /// meantime the result is `Cancelled`, `StaleParent` or `PoolChanged` and
    /// nothing changes.
    pub async fn mine_block(&self, miner_addr: &str) -> Result<Block, MiningError> {
        let job = self.blockchain.read().prepare_mining(miner_addr)?;
        debug!(
            "Mining height {} at difficulty {} with {} pooled transactions",
            job.block().header.block_height,
            job.block().header.difficulty,
            job.block().transactions.len() - 1
        );

        let mined = tokio::task::spawn_blocking(move || job.solve())
            .await
            .map_err(|e| MiningError::Worker(e.to_string()))??;

        self.blockchain.write().commit_mined(mined)
    }

    /// Mines `count` blocks, retrying attempts that lost a race to a new tip
    /// or a changed pool.
    pub async fn mine_blocks(&self, miner_addr: &str, count: usize) -> Result<Vec<Block>, MiningError> {
        let mut mined = Vec::with_capacity(count);
        while mined.len() < count {
            match self.mine_block(miner_addr).await {
                Ok(block) => mined.push(block),
                Err(MiningError::Cancelled)
                | Err(MiningError::StaleParent { .. })
                | Err(MiningError::PoolChanged) => {
                    warn!("Mining attempt superseded, retrying");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(mined)
    }

    pub fn sync_chain(&self, remote: Vec<Block>) -> Result<(), ChainError> {
        let before = self.height();
        self.blockchain.write().sync_chain(remote)?;
        let after = self.height();
        if after != before {
            info!("Node height {} -> {} after sync", before, after);
        }
        Ok(())
    }

    pub fn is_valid_chain(&self, candidate: &[Block]) -> Result<(), ChainError> {
        self.blockchain.read().is_valid_chain(candidate).map(|_| ())
    }

    pub fn get_balance(&self, address: &str) -> Amount {
        self.blockchain.read().get_balance(address)
    }

    pub fn get_nonce(&self, address: &str) -> u64 {
        self.blockchain.read().get_nonce(address)
    }

    pub fn account(&self, address: &str) -> AccountState {
        self.blockchain.read().account(address)
    }

    /// Height of the tip block (genesis is 0).
    pub fn height(&self) -> u64 {
        self.blockchain.read().last_block().header.block_height
    }

    pub fn last_block(&self) -> Block {
        self.blockchain.read().last_block().clone()
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.blockchain.read().blocks().to_vec()
    }

    pub fn block_at(&self, height: u64) -> Option<Block> {
        self.blockchain.read().block_at(height).cloned()
    }

    pub fn difficulty(&self) -> u32 {
        self.blockchain.read().difficulty()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.blockchain.read().pending_transactions().to_vec()
    }

    pub fn config(&self) -> ConsensusConfig {
        self.blockchain.read().config().clone()
    }
}
