// Thin re-export module: implementation is in `blockchain/core.rs`, split
// into chain management, ledger replay and remote-chain validation.

pub mod core;
pub use core::*;
