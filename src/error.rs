//! Error types for ByteChain
//!
//! Each subsystem has its own error enum so callers can tell an admission
//! rejection from a mining abort or a rejected remote chain.

use crate::Amount;
use thiserror::Error;

/// Failures of the cryptographic adapter (keys, signatures, codec).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),
    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),
    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),
    #[error("Signature verification failed")]
    VerificationFailed,
}

/// Failures of a single transaction checked in isolation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("Incomplete transaction: missing {0}")]
    Incomplete(&'static str),
    #[error("Transaction signature verification failed: {0}")]
    SignatureVerificationFailed(String),
    #[error("Transaction timestamp {timestamp} is more than {max_skew}ms away from {now}")]
    StaleOrFutureTimestamp { timestamp: u64, now: u64, max_skew: u64 },
}

impl From<CryptoError> for TransactionError {
    fn from(err: CryptoError) -> Self {
        TransactionError::SignatureVerificationFailed(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Insufficient funds for {address}: required {required}, available {available}")]
    InsufficientFunds {
        address: String,
        required: Amount,
        available: Amount,
    },
}

/// Rejections on the `submit_transaction` path. Any of these leaves the
/// ledger and the mempool untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmissionError {
    #[error("Incomplete transaction: missing {0}")]
    IncompleteTransaction(&'static str),
    #[error("Invalid amount: {0}")]
    InvalidAmount(Amount),
    #[error("Invalid nonce: expected {expected}, got {got}")]
    InvalidNonce { expected: u64, got: u64 },
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(#[source] TransactionError),
    #[error("Transactions from the mint address {0} are issued by the node only")]
    MintNotAllowed(String),
    #[error("Invalid signature: {0}")]
    InvalidSignature(#[source] TransactionError),
    #[error(transparent)]
    InsufficientFunds(#[from] LedgerError),
}

/// A failed mining attempt. Nothing is appended and the pool is kept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MiningError {
    #[error("Reward admission failed: {0}")]
    Admission(#[from] AdmissionError),
    #[error("Mining exhausted after {attempts} nonce attempts")]
    Exhausted { attempts: u64 },
    #[error("Mining cancelled: parent block was replaced")]
    Cancelled,
    #[error("Mining aborted: pending transactions changed while the block was solved")]
    PoolChanged,
    #[error("Stale mining result: mined on {expected}, tip is {tip}")]
    StaleParent { expected: String, tip: String },
    #[error("Mining worker failed: {0}")]
    Worker(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Chain validation failed at height {height}: {reason}")]
    ValidationFailure { height: u64, reason: String },
}

impl ChainError {
    pub(crate) fn at(height: u64, reason: impl Into<String>) -> Self {
        ChainError::ValidationFailure {
            height,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crypto_error_maps_to_signature_failure() {
        let err: TransactionError = CryptoError::VerificationFailed.into();
        assert_eq!(
            err,
            TransactionError::SignatureVerificationFailed("Signature verification failed".to_string())
        );
    }

    #[test]
    fn test_insufficient_funds_is_transparent_in_admission() {
        let err = AdmissionError::from(LedgerError::InsufficientFunds {
            address: "A".to_string(),
            required: 1000,
            available: 60,
        });
        assert_eq!(
            err.to_string(),
            "Insufficient funds for A: required 1000, available 60"
        );
    }
}
