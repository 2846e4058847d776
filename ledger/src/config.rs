//! Consensus parameters.

use dagcore_types::{Amount, NetworkId, Timestamp, MAIN_CHAIN_PERIOD};
use serde::{Deserialize, Serialize};

/// Parameters of one chain. Every field has a default so partial TOML tables load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Selects the header field kind blocks must carry.
    #[serde(default = "default_network")]
    pub network: NetworkId,

    /// Earliest admissible block timestamp.
    #[serde(default = "default_era")]
    pub era: Timestamp,

    /// Reward of the first main block, in raw units.
    #[serde(default = "default_reward_start")]
    pub reward_start: Amount,

    /// The reward halves every `2^reward_halving_log` main blocks.
    #[serde(default = "default_reward_halving_log")]
    pub reward_halving_log: u32,

    /// Ticks a main-chain candidate must age before it can be finalized.
    #[serde(default = "default_confirmation_delay")]
    pub confirmation_delay: u64,

    /// Capacity of the in-memory extra pool.
    #[serde(default = "default_max_extra_blocks")]
    pub max_extra_blocks: usize,

    /// Ticks a block timestamp may run ahead of the local clock.
    #[serde(default = "default_max_future_drift")]
    pub max_future_drift: u64,
}

fn default_network() -> NetworkId {
    NetworkId::Mainnet
}

fn default_era() -> Timestamp {
    Timestamp::new(0x16940000000)
}

fn default_reward_start() -> Amount {
    Amount::from_coins(1024)
}

fn default_reward_halving_log() -> u32 {
    21
}

fn default_confirmation_delay() -> u64 {
    2 * 1024
}

fn default_max_extra_blocks() -> usize {
    65536
}

fn default_max_future_drift() -> u64 {
    MAIN_CHAIN_PERIOD / 4
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            era: default_era(),
            reward_start: default_reward_start(),
            reward_halving_log: default_reward_halving_log(),
            confirmation_delay: default_confirmation_delay(),
            max_extra_blocks: default_max_extra_blocks(),
            max_future_drift: default_max_future_drift(),
        }
    }
}

impl ChainConfig {
    /// A development chain: devnet headers, no era floor.
    pub fn devnet() -> Self {
        Self {
            network: NetworkId::Devnet,
            era: Timestamp::EPOCH,
            ..Self::default()
        }
    }

    /// Reward credited to the main block at `height` (1-based).
    pub fn reward_at(&self, height: u64) -> Amount {
        let halvings = height >> self.reward_halving_log;
        self.reward_start.shr(u32::try_from(halvings).unwrap_or(u32::MAX))
    }
}
