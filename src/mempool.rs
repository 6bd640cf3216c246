//! Transaction mempool
//!
//! Admitted transactions in admission order. The ledger debits for these
//! have already been applied; the credits happen when a block includes them.

use crate::transaction::Transaction;

#[derive(Debug, Clone, Default)]
pub struct Mempool {
    transactions: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn contains(&self, tx_id: &str) -> bool {
        self.transactions.iter().any(|tx| tx.tx_id() == tx_id)
    }

    /// Removes and returns the oldest `count` transactions.
    pub fn drain_front(&mut self, count: usize) -> Vec<Transaction> {
        let count = count.min(self.transactions.len());
        self.transactions.drain(..count).collect()
    }

    pub fn take_all(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }
}
