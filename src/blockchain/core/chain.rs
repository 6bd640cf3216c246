use crate::config::ConsensusConfig;
use crate::consensus::Consensus;
use crate::error::{
    AdmissionError, ChainError, ConfigError, LedgerError, MiningError, TransactionError,
};
use crate::ledger::{AccountState, Ledger};
use crate::mempool::Mempool;
use crate::miner::{CancelToken, MinedBlock, MiningJob};
use crate::transaction::Transaction;
use crate::{now_millis, Amount};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

pub use crate::crypto::Sha256Hash;

use super::validation::validate_chain;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub nonce: u64,
    pub block_height: u64,
    pub timestamp: u64,
    pub merkleroot: String,
    pub prev_block_hash: String,
    /// Empty until the header is finalized.
    pub block_hash: String,
    pub difficulty: u32,
}

impl BlockHeader {
    pub fn compute_hash(&self) -> Sha256Hash {
        let mut hasher = Sha256::new();
        hasher.update(self.block_height.to_le_bytes());
        hasher.update(self.prev_block_hash.as_bytes());
        hasher.update(self.merkleroot.as_bytes());
        hasher.update(self.timestamp.to_le_bytes());
        hasher.update(self.difficulty.to_le_bytes());
        hasher.update(self.nonce.to_le_bytes());
        hasher.finalize().into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(
        height: u64,
        prev_block_hash: String,
        difficulty: u32,
        timestamp: u64,
        transactions: Vec<Transaction>,
    ) -> Self {
        let merkleroot = hex::encode(Block::calculate_merkle_root(&transactions));

        Block {
            header: BlockHeader {
                nonce: 0,
                block_height: height,
                timestamp,
                merkleroot,
                prev_block_hash,
                block_hash: String::new(),
                difficulty,
            },
            transactions,
        }
    }

    /// The deterministic height-0 block: one mint transaction of the genesis
    /// allocation, a sentinel parent, and no proof-of-work.
    pub fn genesis(config: &ConsensusConfig) -> Self {
        let allocation = Transaction::mint(
            config.genesis_allocation,
            &config.mint_address,
            &config.mint_public_key,
            config.genesis_recipient.clone(),
            config.genesis_timestamp_ms,
        );

        let mut block = Block::new(
            0,
            config.genesis_prev_hash.clone(),
            config.min_difficulty,
            config.genesis_timestamp_ms,
            vec![allocation],
        );
        block.header.block_hash = hex::encode(block.header.compute_hash());
        block
    }

    pub fn hash(&self) -> &str {
        &self.header.block_hash
    }

    /// Binary SHA-256 tree over transaction digests; odd levels duplicate
    /// their last node. No transactions yields the all-zero digest.
    pub fn calculate_merkle_root(transactions: &[Transaction]) -> Sha256Hash {
        let mut level: Vec<Sha256Hash> = transactions.iter().map(Transaction::digest).collect();
        if level.is_empty() {
            return [0u8; 32];
        }

        while level.len() > 1 {
            level = level
                .chunks(2)
                .map(|pair| {
                    let left = pair[0];
                    let right = pair.get(1).copied().unwrap_or(left);
                    let mut hasher = Sha256::new();
                    hasher.update(left);
                    hasher.update(right);
                    hasher.finalize().into()
                })
                .collect();
        }
        level[0]
    }
}

/// The replicated state: chain, ledger, and pending pool, owned together.
///
/// Every mutation goes through `&mut self`, so wrapping one `Blockchain` in a
/// single lock (see [`crate::node::Node`]) serialises admission, block
/// commits, and chain replacement against each other.
pub struct Blockchain {
    config: ConsensusConfig,
    blocks: Vec<Block>,
    ledger: Ledger,
    mempool: Mempool,
    difficulty: u32,
    /// Held by every outstanding [`MiningJob`]; cancelled when the tip moves.
    tip_token: CancelToken,
}

#[allow(clippy::len_without_is_empty)]
impl Blockchain {
    pub fn new(config: ConsensusConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut blockchain = Blockchain {
            blocks: Vec::new(),
            ledger: Ledger::new(),
            mempool: Mempool::new(),
            difficulty: config.min_difficulty,
            tip_token: CancelToken::new(),
            config,
        };

        let genesis = Block::genesis(&blockchain.config);
        for tx in &genesis.transactions {
            blockchain
                .admit(tx.clone())
                .map_err(|e| ConfigError::Invalid(format!("Genesis allocation rejected: {}", e)))?;
        }
        let included = blockchain.mempool.len();
        blockchain.commit(genesis, included);

        info!(
            "Initialized chain with genesis {} ({} to {})",
            blockchain.last_block().hash(),
            blockchain.config.genesis_allocation,
            blockchain.config.genesis_recipient
        );
        Ok(blockchain)
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn block_at(&self, height: u64) -> Option<&Block> {
        usize::try_from(height).ok().and_then(|h| self.blocks.get(h))
    }

    pub fn last_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    /// Difficulty the next mined block will carry.
    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn mempool(&self) -> &Mempool {
        &self.mempool
    }

    pub fn pending_transactions(&self) -> &[Transaction] {
        self.mempool.transactions()
    }

    pub fn get_balance(&self, address: &str) -> Amount {
        self.ledger.get_balance(address)
    }

    pub fn get_nonce(&self, address: &str) -> u64 {
        self.ledger.get_nonce(address)
    }

    pub fn account(&self, address: &str) -> AccountState {
        self.ledger.account(address)
    }

    /// Admission rules, checked in order without touching any state.
    /// Mint transactions skip everything after the amount check.
    fn check_admission(&self, tx: &Transaction, now: u64) -> Result<(), AdmissionError> {
        if tx.sender().is_empty() {
            return Err(AdmissionError::IncompleteTransaction("sender"));
        }
        if tx.recipient().is_empty() {
            return Err(AdmissionError::IncompleteTransaction("recipient"));
        }

        if tx.amount() < 0 {
            return Err(AdmissionError::InvalidAmount(tx.amount()));
        }

        if tx.is_mint(&self.config.mint_address) {
            return Ok(());
        }

        let expected = self.ledger.get_nonce(tx.sender()) + 1;
        if tx.nonce() != expected {
            return Err(AdmissionError::InvalidNonce {
                expected,
                got: tx.nonce(),
            });
        }

        // Same future-dating bound as chain validation.
        let max_skew = self.config.max_time_diff_tx_ms;
        if tx.timestamp() > now.saturating_add(max_skew) {
            return Err(AdmissionError::InvalidTimestamp(
                TransactionError::StaleOrFutureTimestamp {
                    timestamp: tx.timestamp(),
                    now,
                    max_skew,
                },
            ));
        }

        tx.verify_signature(&self.config.mint_address)
            .map_err(|e| match e {
                TransactionError::Incomplete(field) => AdmissionError::IncompleteTransaction(field),
                other => AdmissionError::InvalidSignature(other),
            })?;

        let available = self.ledger.get_balance(tx.sender());
        if available < tx.amount() {
            return Err(LedgerError::InsufficientFunds {
                address: tx.sender().to_string(),
                required: tx.amount(),
                available,
            }
            .into());
        }

        Ok(())
    }

    /// Admits a transaction into the mempool, debiting the sender and
    /// consuming its nonce. On any error nothing is changed.
    ///
    /// The mint address is reserved: block rewards are added by the miner and
    /// the genesis allocation by [`Self::new`], so mint-sender transactions
    /// are refused here.
    pub fn submit_transaction(&mut self, tx: Transaction) -> Result<Transaction, AdmissionError> {
        if tx.is_mint(&self.config.mint_address) {
            debug!("Rejected mint-sender transaction {}", tx.tx_id());
            return Err(AdmissionError::MintNotAllowed(tx.sender().to_string()));
        }
        self.admit(tx)
    }

    fn admit(&mut self, tx: Transaction) -> Result<Transaction, AdmissionError> {
        if let Err(e) = self.check_admission(&tx, now_millis()) {
            debug!("Rejected transaction {}: {}", tx.tx_id(), e);
            return Err(e);
        }

        if !tx.is_mint(&self.config.mint_address) {
            self.ledger.debit(tx.sender(), tx.amount())?;
            self.ledger.increment_nonce(tx.sender());
        }
        self.mempool.push(tx.clone());

        debug!(
            "Admitted transaction {} ({} from {} to {}, nonce {})",
            tx.tx_id(),
            tx.amount(),
            tx.sender(),
            tx.recipient(),
            tx.nonce()
        );
        Ok(tx)
    }

    /// Snapshots the pool, tip, and difficulty into a candidate block with the
    /// miner's reward last. Nothing is mutated until [`Self::commit_mined`].
    pub fn prepare_mining(&self, miner_addr: &str) -> Result<MiningJob, MiningError> {
        let now = now_millis();
        let reward = Transaction::mint(
            self.config.block_reward,
            &self.config.mint_address,
            &self.config.mint_public_key,
            miner_addr,
            now,
        );
        self.check_admission(&reward, now)?;
        let (block, included) = self.assemble_block(reward, now);

        Ok(MiningJob {
            block,
            included,
            max_attempts: self.config.max_nonce_attempts,
            cancel: self.tip_token.clone(),
        })
    }

    /// Builds the next block over the whole pool with `reward` appended, and
    /// returns it with the number of pool transactions it includes.
    pub fn assemble_block(&self, reward: Transaction, timestamp: u64) -> (Block, usize) {
        let parent = self.last_block();
        let mut transactions = self.mempool.transactions().to_vec();
        let included = transactions.len();
        transactions.push(reward);

        let block = Block::new(
            parent.header.block_height + 1,
            parent.header.block_hash.clone(),
            self.difficulty,
            timestamp,
            transactions,
        );
        (block, included)
    }

    /// Appends a solved block if it still extends the current tip.
    pub fn commit_mined(&mut self, mined: MinedBlock) -> Result<Block, MiningError> {
        let tip = self.last_block().hash();
        if mined.block.header.prev_block_hash != tip {
            warn!(
                "Discarding block mined on {}: tip is now {}",
                mined.block.header.prev_block_hash, tip
            );
            return Err(MiningError::StaleParent {
                expected: mined.block.header.prev_block_hash.clone(),
                tip: tip.to_string(),
            });
        }

        let pool_matches = self
            .mempool
            .transactions()
            .get(..mined.included)
            .is_some_and(|prefix| {
                prefix
                    .iter()
                    .zip(&mined.block.transactions)
                    .all(|(pooled, included)| pooled.tx_id() == included.tx_id())
            });
        if !pool_matches {
            warn!("Discarding mined block: mempool changed underneath it");
            return Err(MiningError::PoolChanged);
        }

        let MinedBlock { block, included } = mined;
        self.commit(block, included);

        let block = self.last_block().clone();
        info!(
            "Mined block {} at height {} ({} transactions, nonce {}, difficulty {})",
            block.header.block_hash,
            block.header.block_height,
            block.transactions.len(),
            block.header.nonce,
            block.header.difficulty
        );
        Ok(block)
    }

    /// Reward, assemble, proof-of-work, append and retarget, inline.
    pub fn mine_block(&mut self, miner_addr: &str) -> Result<Block, MiningError> {
        let job = self.prepare_mining(miner_addr)?;
        let mined = job.solve()?;
        self.commit_mined(mined)
    }

    /// Credits every included transaction, drains them from the pool, appends
    /// the block and retargets. Callers have already checked the parent.
    fn commit(&mut self, block: Block, included: usize) {
        for tx in &block.transactions {
            self.ledger.credit(tx.recipient(), tx.amount());
        }
        self.mempool.drain_front(included);
        self.blocks.push(block);
        self.advance_tip();
        self.recompute_difficulty();
    }

    fn recompute_difficulty(&mut self) {
        let previous = self.difficulty;
        self.difficulty = Consensus::next_difficulty(&self.blocks, previous, &self.config);
        if self.difficulty != previous {
            info!("Difficulty retargeted {} -> {}", previous, self.difficulty);
        }
    }

    fn advance_tip(&mut self) {
        self.tip_token.cancel();
        self.tip_token = CancelToken::new();
    }

    /// Validates `candidate` as a full chain and returns the ledger obtained
    /// by replaying it.
    pub fn is_valid_chain(&self, candidate: &[Block]) -> Result<Ledger, ChainError> {
        validate_chain(candidate, &self.config, now_millis())
    }

    /// Adopts `remote` if it is strictly longer and valid; otherwise a no-op.
    ///
    /// On adoption the ledger is rebuilt by replay, outstanding mining jobs
    /// are cancelled, and pending transactions are re-admitted against the
    /// new ledger (those that no longer pass are dropped).
    pub fn sync_chain(&mut self, remote: Vec<Block>) -> Result<(), ChainError> {
        if !Consensus::prefers_remote(self.blocks.len(), remote.len()) {
            debug!(
                "Ignoring remote chain of length {} (local {})",
                remote.len(),
                self.blocks.len()
            );
            return Ok(());
        }

        let ledger = self.is_valid_chain(&remote)?;
        let schedule = Consensus::difficulty_schedule(&remote, &self.config);

        let replaced = self.blocks.len();
        self.blocks = remote;
        self.ledger = ledger;
        self.difficulty = schedule
            .last()
            .copied()
            .unwrap_or(self.config.min_difficulty);
        self.advance_tip();

        for tx in self.mempool.take_all() {
            let tx_id = tx.tx_id().to_string();
            if let Err(e) = self.submit_transaction(tx) {
                warn!("Dropped pending transaction {} after chain replacement: {}", tx_id, e);
            }
        }

        info!(
            "Adopted remote chain: length {} -> {}, tip {}",
            replaced,
            self.blocks.len(),
            self.last_block().hash()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn test_config() -> ConsensusConfig {
        ConsensusConfig {
            min_difficulty: 1,
            max_difficulty: 8,
            ..ConsensusConfig::default()
        }
    }

    fn transfer(keypair: &KeyPair, from: &str, to: &str, amount: Amount, nonce: u64) -> Transaction {
        let mut tx = Transaction::new(amount, from, to, 0, now_millis(), keypair.public_key_hex(), nonce);
        tx.sign(keypair);
        tx
    }

    /// Spends from the genesis allocation; addresses are not bound to keys.
    fn from_genesis(chain: &Blockchain, to: &str, amount: Amount) -> Transaction {
        let nonce = chain.get_nonce("BC-GEN") + 1;
        transfer(&KeyPair::generate(), "BC-GEN", to, amount, nonce)
    }

    /// Funds `address` from the genesis allocation and mines the transfer.
    fn fund(chain: &mut Blockchain, address: &str, amount: Amount) {
        let tx = from_genesis(chain, address, amount);
        chain.submit_transaction(tx).unwrap();
        chain.mine_block("funding-miner").unwrap();
    }

    #[test]
    fn test_genesis() {
        let chain = Blockchain::new(test_config()).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.get_balance("BC-GEN"), 1_000_000_000);
        assert!(chain.mempool().is_empty());

        let genesis = &chain.blocks()[0];
        assert_eq!(genesis.header.block_height, 0);
        assert_eq!(genesis.header.prev_block_hash, chain.config().genesis_prev_hash);
        assert_eq!(genesis, &Block::genesis(chain.config()));
    }

    #[test]
    fn test_invalid_config_refused() {
        let config = ConsensusConfig {
            min_difficulty: 9,
            max_difficulty: 2,
            ..ConsensusConfig::default()
        };
        assert!(Blockchain::new(config).is_err());
    }

    #[test]
    fn test_merkle_root_of_empty_and_odd_sets() {
        assert_eq!(Block::calculate_merkle_root(&[]), [0u8; 32]);

        let a = Transaction::new(1, "A", "B", 0, 0, "pk", 1);
        let b = Transaction::new(2, "A", "B", 0, 0, "pk", 2);
        let c = Transaction::new(3, "A", "B", 0, 0, "pk", 3);
        assert_eq!(Block::calculate_merkle_root(std::slice::from_ref(&a)), a.digest());

        let odd = Block::calculate_merkle_root(&[a.clone(), b.clone(), c.clone()]);
        let padded = Block::calculate_merkle_root(&[a, b, c.clone(), c]);
        assert_eq!(odd, padded);
    }

    #[test]
    fn test_admission_debits_sender_and_consumes_nonce() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let alice = KeyPair::generate();
        fund(&mut chain, "A", 100);

        chain.submit_transaction(transfer(&alice, "A", "B", 40, 1)).unwrap();
        assert_eq!(chain.get_balance("A"), 60);
        assert_eq!(chain.get_nonce("A"), 1);
        // Recipient is credited only once the block is mined.
        assert_eq!(chain.get_balance("B"), 0);
        assert_eq!(chain.pending_transactions().len(), 1);

        chain.mine_block("miner").unwrap();
        assert_eq!(chain.get_balance("B"), 40);
        assert!(chain.mempool().is_empty());
    }

    #[test]
    fn test_bad_signature_burns_nothing() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let victim = KeyPair::generate();
        let attacker = KeyPair::generate();
        fund(&mut chain, "victim", 100);

        let mut forged = Transaction::new(50, "victim", "attacker", 0, now_millis(), victim.public_key_hex(), 1);
        forged.sign(&attacker);

        let err = chain.submit_transaction(forged).unwrap_err();
        assert!(matches!(err, AdmissionError::InvalidSignature(_)));
        assert_eq!(chain.get_nonce("victim"), 0);
        assert_eq!(chain.get_balance("victim"), 100);
        assert!(chain.mempool().is_empty());
    }

    #[test]
    fn test_negative_amount_rejected() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let alice = KeyPair::generate();

        let err = chain.submit_transaction(transfer(&alice, "A", "B", -5, 1)).unwrap_err();
        assert_eq!(err, AdmissionError::InvalidAmount(-5));
    }

    #[test]
    fn test_nonce_gap_rejected() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let alice = KeyPair::generate();
        fund(&mut chain, "A", 100);

        let err = chain.submit_transaction(transfer(&alice, "A", "B", 1, 2)).unwrap_err();
        assert_eq!(err, AdmissionError::InvalidNonce { expected: 1, got: 2 });
    }

    #[test]
    fn test_missing_recipient_is_incomplete() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let alice = KeyPair::generate();

        let err = chain.submit_transaction(transfer(&alice, "A", "", 1, 1)).unwrap_err();
        assert_eq!(err, AdmissionError::IncompleteTransaction("recipient"));
    }

    #[test]
    fn test_unsigned_transaction_is_incomplete() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let alice = KeyPair::generate();
        let unsigned = Transaction::new(1, "A", "B", 0, now_millis(), alice.public_key_hex(), 1);

        let err = chain.submit_transaction(unsigned).unwrap_err();
        assert_eq!(err, AdmissionError::IncompleteTransaction("signature"));
    }

    #[test]
    fn test_assembly_puts_reward_last_without_touching_pool() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let cfg = chain.config().clone();
        let pending = from_genesis(&chain, "A", 5);
        chain.submit_transaction(pending.clone()).unwrap();

        let reward = Transaction::mint(32, &cfg.mint_address, &cfg.mint_public_key, "miner", 7);
        let (block, included) = chain.assemble_block(reward.clone(), 7);
        assert_eq!(included, 1);
        assert_eq!(block.transactions, vec![pending, reward]);
        assert_eq!(block.header.block_height, 1);
        assert_eq!(block.header.prev_block_hash, chain.last_block().hash());
        assert_eq!(chain.mempool().len(), 1);
        assert_eq!(chain.get_balance("A"), 0);
    }

    #[test]
    fn test_mined_block_links_to_parent_and_retargets() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        for _ in 0..6 {
            let parent_hash = chain.last_block().hash().to_string();
            let block = chain.mine_block("miner").unwrap();
            assert_eq!(block.header.prev_block_hash, parent_hash);
            assert!(crate::miner::meets_difficulty(
                &block.header.compute_hash(),
                block.header.difficulty
            ));
        }

        assert_eq!(chain.len(), 7);
        assert_eq!(chain.get_balance("miner"), 6 * chain.config().block_reward);
        let schedule = Consensus::difficulty_schedule(chain.blocks(), chain.config());
        assert_eq!(schedule.last().copied(), Some(chain.difficulty()));
    }

    #[test]
    fn test_stale_job_is_not_committed() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let stale = chain.prepare_mining("slow-miner").unwrap();
        chain.mine_block("fast-miner").unwrap();

        assert!(stale.is_cancelled());
        let len = chain.len();
        let result = stale.solve().and_then(|mined| chain.commit_mined(mined));
        assert!(matches!(
            result,
            Err(MiningError::Cancelled) | Err(MiningError::StaleParent { .. })
        ));
        assert_eq!(chain.len(), len);
        assert_eq!(chain.get_balance("slow-miner"), 0);
    }

    #[test]
    fn test_exhausted_mining_keeps_pool() {
        let config = ConsensusConfig {
            min_difficulty: 64,
            max_difficulty: 64,
            max_nonce_attempts: 3,
            ..ConsensusConfig::default()
        };
        let mut chain = Blockchain::new(config).unwrap();
        let pending = from_genesis(&chain, "A", 5);
        chain.submit_transaction(pending).unwrap();

        let err = chain.mine_block("miner").unwrap_err();
        assert_eq!(err, MiningError::Exhausted { attempts: 3 });
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.mempool().len(), 1);
        assert_eq!(chain.get_balance("A"), 0);
        assert_eq!(chain.get_balance("miner"), 0);
    }

    #[test]
    fn test_empty_miner_address_fails_reward_admission() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let err = chain.mine_block("").unwrap_err();
        assert_eq!(
            err,
            MiningError::Admission(AdmissionError::IncompleteTransaction("recipient"))
        );
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_future_dated_transaction_rejected() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let key = KeyPair::generate();
        let late = now_millis() + 60 * 60 * 1000;
        let mut tx = Transaction::new(10, "BC-GEN", "B", 0, late, key.public_key_hex(), 1);
        tx.sign(&key);

        let err = chain.submit_transaction(tx).unwrap_err();
        assert!(matches!(
            err,
            AdmissionError::InvalidTimestamp(TransactionError::StaleOrFutureTimestamp { .. })
        ));
        assert_eq!(chain.get_nonce("BC-GEN"), 0);
        assert_eq!(chain.get_balance("BC-GEN"), 1_000_000_000);
        assert!(chain.mempool().is_empty());
    }

    #[test]
    fn test_timestamp_within_skew_admitted() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let key = KeyPair::generate();
        let soon = now_millis() + chain.config().max_time_diff_tx_ms / 2;
        let mut tx = Transaction::new(10, "BC-GEN", "B", 0, soon, key.public_key_hex(), 1);
        tx.sign(&key);

        chain.submit_transaction(tx).unwrap();
        chain.mine_block("miner").unwrap();
        assert!(chain.is_valid_chain(chain.blocks()).is_ok());
    }

    #[test]
    fn test_mined_chain_always_passes_own_validation() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let alice = KeyPair::generate();
        fund(&mut chain, "A", 100);
        for nonce in 1..=3 {
            chain.submit_transaction(transfer(&alice, "A", "B", 10, nonce)).unwrap();
            chain.mine_block("miner").unwrap();
        }

        let ledger = chain.is_valid_chain(chain.blocks()).unwrap();
        assert_eq!(&ledger, chain.ledger());
    }

    #[test]
    fn test_mint_sender_refused_on_public_path() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let cfg = chain.config().clone();
        let mint = Transaction::mint(5, &cfg.mint_address, &cfg.mint_public_key, "A", now_millis());

        let err = chain.submit_transaction(mint).unwrap_err();
        assert_eq!(err, AdmissionError::MintNotAllowed(cfg.mint_address.clone()));
        assert!(chain.mempool().is_empty());
    }

    #[test]
    fn test_negative_mint_rejected_before_bypass() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let cfg = chain.config().clone();
        let mint = Transaction::mint(-5, &cfg.mint_address, &cfg.mint_public_key, "A", now_millis());

        assert_eq!(chain.admit(mint).unwrap_err(), AdmissionError::InvalidAmount(-5));
        assert!(chain.mempool().is_empty());

        chain.mine_block("miner").unwrap();
        assert_eq!(chain.get_balance("A"), 0);
    }

    #[test]
    fn test_changed_pool_is_reported_distinctly() {
        let mut chain = Blockchain::new(test_config()).unwrap();
        let pending = from_genesis(&chain, "A", 5);
        chain.submit_transaction(pending).unwrap();

        let job = chain.prepare_mining("miner").unwrap();
        chain.mempool.take_all();

        let result = job.solve().and_then(|mined| chain.commit_mined(mined));
        assert_eq!(result, Err(MiningError::PoolChanged));
        assert_eq!(chain.len(), 1);
    }
}
