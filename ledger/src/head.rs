//! Chain head and statistics, owned by the engine and persisted in the meta store.

use dagcore_types::{Amount, BlockAddress, Difficulty};
use serde::{Deserialize, Serialize};

/// Meta-store key of the serialized [`ChainHead`].
pub(crate) const HEAD_KEY: &str = "chain_head";

/// Meta-store key of the serialized [`ChainStats`].
pub(crate) const STATS_KEY: &str = "chain_stats";

/// The current best tip and the best tip of the open epoch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainHead {
    pub top: Option<BlockAddress>,
    pub top_difficulty: Difficulty,
    /// Best link of `top`. Always durable, so a restart that loses an
    /// in-memory top can fall back to it.
    pub top_link: Option<BlockAddress>,
    pub pretop: Option<BlockAddress>,
    pub pretop_difficulty: Difficulty,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainStats {
    /// Blocks currently admitted.
    pub nblocks: u64,
    pub total_nblocks: u64,
    /// Finalized main blocks.
    pub nmain: u64,
    pub total_nmain: u64,
    /// Durable tips.
    pub nnoref: u64,
    /// Blocks in the extra pool.
    pub nextra: u64,
    /// Accumulated difficulty of the top.
    pub difficulty: Difficulty,
    pub max_difficulty: Difficulty,
    /// Sum of the balances of locally-owned blocks.
    pub balance: Amount,
}

impl ChainStats {
    pub(crate) fn block_added(&mut self) {
        self.nblocks += 1;
        self.total_nblocks = self.total_nblocks.max(self.nblocks);
    }

    pub(crate) fn block_dropped(&mut self) {
        self.nblocks = self.nblocks.saturating_sub(1);
    }

    pub(crate) fn main_added(&mut self) {
        self.nmain += 1;
        self.total_nmain = self.total_nmain.max(self.nmain);
    }

    pub(crate) fn main_removed(&mut self) {
        self.nmain = self.nmain.saturating_sub(1);
    }

    pub(crate) fn set_difficulty(&mut self, difficulty: &Difficulty) {
        self.difficulty = difficulty.clone();
        if *difficulty > self.max_difficulty {
            self.max_difficulty = difficulty.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_track_maximum() {
        let mut stats = ChainStats::default();
        stats.block_added();
        stats.block_added();
        stats.block_dropped();
        assert_eq!((stats.nblocks, stats.total_nblocks), (1, 2));

        stats.main_added();
        stats.main_removed();
        stats.main_removed();
        assert_eq!((stats.nmain, stats.total_nmain), (0, 1));
    }

    #[test]
    fn max_difficulty_never_drops() {
        let mut stats = ChainStats::default();
        stats.set_difficulty(&Difficulty::from_u128(9));
        stats.set_difficulty(&Difficulty::from_u128(4));
        assert_eq!(stats.difficulty, Difficulty::from_u128(4));
        assert_eq!(stats.max_difficulty, Difficulty::from_u128(9));
    }

    #[test]
    fn bincode_round_trip() {
        let head = ChainHead {
            top: Some(BlockAddress::from_low_bytes([1u8; 24])),
            top_difficulty: Difficulty::from_u128(u128::MAX),
            ..ChainHead::default()
        };
        let bytes = bincode::serialize(&head).unwrap();
        assert_eq!(bincode::deserialize::<ChainHead>(&bytes).unwrap(), head);
    }
}
