//! Configuration management for ByteChain
//!
//! All consensus constants live in [`ConsensusConfig`]. Nodes that want to
//! agree on a chain must run with the same values.

use crate::error::ConfigError;
use crate::Amount;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConsensusConfig {
    #[serde(default = "default_block_reward")]
    pub block_reward: Amount,
    /// Target duration of one retarget window, in milliseconds.
    #[serde(default = "default_block_time_diff_ms")]
    pub block_time_diff_ms: u64,
    #[serde(default = "default_block_window")]
    pub block_window: usize,
    /// Difficulty is a count of leading zero bits in the header hash.
    #[serde(default = "default_min_difficulty")]
    pub min_difficulty: u32,
    #[serde(default = "default_max_difficulty")]
    pub max_difficulty: u32,
    #[serde(default = "default_max_nonce_attempts")]
    pub max_nonce_attempts: u64,
    #[serde(default = "default_max_time_diff_tx_ms")]
    pub max_time_diff_tx_ms: u64,
    #[serde(default = "default_mint_address")]
    pub mint_address: String,
    #[serde(default = "default_mint_public_key")]
    pub mint_public_key: String,
    #[serde(default = "default_genesis_prev_hash")]
    pub genesis_prev_hash: String,
    #[serde(default = "default_genesis_allocation")]
    pub genesis_allocation: Amount,
    #[serde(default = "default_genesis_recipient")]
    pub genesis_recipient: String,
    #[serde(default = "default_genesis_timestamp_ms")]
    pub genesis_timestamp_ms: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            block_reward: default_block_reward(),
            block_time_diff_ms: default_block_time_diff_ms(),
            block_window: default_block_window(),
            min_difficulty: default_min_difficulty(),
            max_difficulty: default_max_difficulty(),
            max_nonce_attempts: default_max_nonce_attempts(),
            max_time_diff_tx_ms: default_max_time_diff_tx_ms(),
            mint_address: default_mint_address(),
            mint_public_key: default_mint_public_key(),
            genesis_prev_hash: default_genesis_prev_hash(),
            genesis_allocation: default_genesis_allocation(),
            genesis_recipient: default_genesis_recipient(),
            genesis_timestamp_ms: default_genesis_timestamp_ms(),
        }
    }
}

impl ConsensusConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_difficulty > self.max_difficulty {
            return Err(ConfigError::Invalid(format!(
                "min_difficulty ({}) exceeds max_difficulty ({})",
                self.min_difficulty, self.max_difficulty
            )));
        }
        if self.max_difficulty > 256 {
            return Err(ConfigError::Invalid(format!(
                "max_difficulty ({}) exceeds the 256-bit hash width",
                self.max_difficulty
            )));
        }
        if self.block_window < 2 {
            return Err(ConfigError::Invalid(
                "block_window must span at least 2 blocks".to_string(),
            ));
        }
        if self.max_nonce_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_nonce_attempts must be positive".to_string(),
            ));
        }
        if self.block_reward < 0 || self.genesis_allocation < 0 {
            return Err(ConfigError::Invalid(
                "block_reward and genesis_allocation must not be negative".to_string(),
            ));
        }
        if self.mint_address.is_empty()
            || self.genesis_recipient.is_empty()
            || self.genesis_prev_hash.is_empty()
        {
            return Err(ConfigError::Invalid(
                "mint_address, genesis_recipient and genesis_prev_hash must be set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load a config from a TOML file. A missing file yields the defaults.
pub fn load_config(path: impl AsRef<Path>) -> Result<ConsensusConfig, ConfigError> {
    let path = path.as_ref();
    let config = if path.exists() {
        let config_str = fs::read_to_string(path)?;
        toml::from_str(&config_str)?
    } else {
        ConsensusConfig::default()
    };

    config.validate()?;
    Ok(config)
}

fn default_block_reward() -> Amount {
    32
}

fn default_block_time_diff_ms() -> u64 {
    200
}

fn default_block_window() -> usize {
    4
}

fn default_min_difficulty() -> u32 {
    4
}

fn default_max_difficulty() -> u32 {
    10
}

fn default_max_nonce_attempts() -> u64 {
    10_000_000
}

fn default_max_time_diff_tx_ms() -> u64 {
    10_000
}

fn default_mint_address() -> String {
    "0xByteChain".to_string()
}

fn default_mint_public_key() -> String {
    "0xByteChainPublicKey".to_string()
}

fn default_genesis_prev_hash() -> String {
    "0000000000000000000000000000000000ByteChain".to_string()
}

fn default_genesis_allocation() -> Amount {
    1_000_000_000
}

fn default_genesis_recipient() -> String {
    "BC-GEN".to_string()
}

fn default_genesis_timestamp_ms() -> u64 {
    1_672_531_200_000
}
