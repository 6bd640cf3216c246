//! Account state: the authoritative balance and nonce table.

use crate::error::LedgerError;
use crate::{Address, Amount};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    pub nonce: u64,
    pub balance: Amount,
}

/// Address-keyed account table. Accounts appear as `{0, 0}` on first touch;
/// `debit` is the only place a balance can go down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    accounts: HashMap<Address, AccountState>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_account(&mut self, address: &str) -> &mut AccountState {
        self.accounts.entry(address.to_string()).or_default()
    }

    /// Read-only view; unknown addresses read as `{0, 0}` without being created.
    pub fn account(&self, address: &str) -> AccountState {
        self.accounts.get(address).copied().unwrap_or_default()
    }

    pub fn get_nonce(&self, address: &str) -> u64 {
        self.account(address).nonce
    }

    pub fn get_balance(&self, address: &str) -> Amount {
        self.account(address).balance
    }

    pub fn increment_nonce(&mut self, address: &str) {
        let state = self.ensure_account(address);
        state.nonce += 1;
    }

    /// Callers pass validated, non-negative amounts.
    pub fn credit(&mut self, address: &str, amount: Amount) {
        debug_assert!(amount >= 0, "credit of negative amount {}", amount);
        let state = self.ensure_account(address);
        state.balance = state.balance.saturating_add(amount);
    }

    pub fn debit(&mut self, address: &str, amount: Amount) -> Result<(), LedgerError> {
        let state = self.ensure_account(address);
        if state.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                address: address.to_string(),
                required: amount,
                available: state.balance,
            });
        }
        state.balance -= amount;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.accounts.clear();
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &AccountState)> {
        self.accounts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_account_reads_zero() {
        let ledger = Ledger::new();
        assert_eq!(ledger.account("nobody"), AccountState::default());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_credit_and_debit() {
        let mut ledger = Ledger::new();
        ledger.credit("A", 100);
        ledger.debit("A", 40).unwrap();
        assert_eq!(ledger.get_balance("A"), 60);
    }

    #[test]
    fn test_overdraft_rejected_without_mutation() {
        let mut ledger = Ledger::new();
        ledger.credit("A", 60);

        let err = ledger.debit("A", 1000).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                address: "A".to_string(),
                required: 1000,
                available: 60,
            }
        );
        assert_eq!(ledger.get_balance("A"), 60);
    }

    #[test]
    fn test_debit_of_exact_balance_reaches_zero() {
        let mut ledger = Ledger::new();
        ledger.credit("A", 5);
        ledger.debit("A", 5).unwrap();
        assert_eq!(ledger.get_balance("A"), 0);
        assert!(ledger.debit("A", 1).is_err());
    }

    #[test]
    fn test_nonce_increments_by_one() {
        let mut ledger = Ledger::new();
        ledger.increment_nonce("A");
        ledger.increment_nonce("A");
        assert_eq!(ledger.get_nonce("A"), 2);
        assert_eq!(ledger.get_nonce("B"), 0);
    }
}
