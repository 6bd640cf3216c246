//! ByteChain - an account-based ledger secured by proof-of-work
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## Core Blockchain
//! - [`blockchain`] - Blocks, the chain aggregate, replay and chain validation
//! - [`transaction`] - Transaction types, signing and verification
//! - [`ledger`] - Account balances and nonces
//! - [`mempool`] - Admitted transactions awaiting inclusion
//!
//! ## Consensus
//! - [`miner`] - Proof-of-work search
//! - [`consensus`] - Difficulty retargeting and fork choice
//!
//! ## Cryptography
//! - [`crypto`] - Digests, signatures and the signature codec (secp256k1)
//!
//! ## Runtime
//! - [`node`] - Shared node handle; runs proof-of-work off the critical section
//!
//! ## Configuration & Utilities
//! - [`config`] - Consensus constants
//! - [`error`] - Error types

#![forbid(unsafe_code)]

// ============================================================================
// Core Blockchain
// ============================================================================
pub mod blockchain;
pub mod ledger;
pub mod mempool;
pub mod transaction;

// ============================================================================
// Consensus & Mining
// ============================================================================
pub mod consensus;
pub mod miner;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Runtime
// ============================================================================
pub mod node;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;

/// Opaque account identifier.
pub type Address = String;

/// Signed so that negative amounts can be detected and rejected.
pub type Amount = i64;

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
