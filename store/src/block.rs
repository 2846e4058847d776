//! Block storage trait and the mutable per-block record.

use dagcore_types::{Amount, BlockAddress, BlockFlags, BlockHash, Difficulty, Timestamp};
use serde::{Deserialize, Serialize};

use crate::StoreError;

/// Everything about a block that changes after it is parsed.
///
/// Raw wire bytes are stored separately and never rewritten; this record is
/// re-put after every mutation of a durable block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub address: BlockAddress,
    pub hash: BlockHash,
    pub timestamp: Timestamp,
    pub fee: Amount,
    pub flags: BlockFlags,
    /// Accumulated difficulty, fixed at admission.
    pub difficulty: Difficulty,
    /// Link that contributed the maximum accumulated difficulty.
    pub best_link: Option<BlockAddress>,
    /// Later block that claimed this one while applying a finalized block.
    pub finalizing_ref: Option<BlockAddress>,
    pub balance: Amount,
    /// Main-chain height; zero unless finalized.
    pub height: u64,
}

impl BlockInfo {
    pub fn new(address: BlockAddress, hash: BlockHash, timestamp: Timestamp, fee: Amount) -> Self {
        Self {
            address,
            hash,
            timestamp,
            fee,
            flags: BlockFlags::empty(),
            difficulty: Difficulty::zero(),
            best_link: None,
            finalizing_ref: None,
            balance: Amount::ZERO,
            height: 0,
        }
    }
}

/// Durable block storage keyed by block address.
pub trait BlockStore {
    /// Store the 512 raw bytes of a block.
    fn put_block(&self, address: &BlockAddress, raw: &[u8]) -> Result<(), StoreError>;

    fn get_block(&self, address: &BlockAddress) -> Result<Option<Vec<u8>>, StoreError>;

    fn exists(&self, address: &BlockAddress) -> Result<bool, StoreError>;

    /// Remove raw bytes and record of a block.
    fn delete_block(&self, address: &BlockAddress) -> Result<(), StoreError>;

    fn put_info(&self, info: &BlockInfo) -> Result<(), StoreError>;

    fn get_info(&self, address: &BlockAddress) -> Result<Option<BlockInfo>, StoreError>;

    fn block_count(&self) -> Result<u64, StoreError>;

    /// Record the finalized block at a main-chain height.
    fn put_main_height(&self, height: u64, address: &BlockAddress) -> Result<(), StoreError>;

    fn main_at_height(&self, height: u64) -> Result<Option<BlockAddress>, StoreError>;

    fn delete_main_height(&self, height: u64) -> Result<(), StoreError>;
}
