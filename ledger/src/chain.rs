//! The shared chain handle.

use std::sync::Arc;

use dagcore_crypto::Keyring;
use dagcore_store::{BlockInfo, ChainStore};
use dagcore_types::{Amount, BlockAddress, Clock, Timestamp};
use parking_lot::RwLock;

use crate::state::ChainState;
use crate::{Block, ChainConfig, ChainHead, ChainStats, ImportResult, LedgerError};

/// The consensus engine behind one read/write lock.
///
/// Admission and finalization take the write lock and run to completion
/// inside it, so a reorganization's unfinalize steps never interleave with a
/// finalization. Queries take the read lock.
pub struct Dagchain<S: ChainStore> {
    pub(crate) state: RwLock<ChainState<S>>,
}

impl<S: ChainStore> Dagchain<S> {
    /// Open the chain, restoring head and statistics from the store.
    pub fn open(
        store: Arc<S>,
        config: ChainConfig,
        keyring: Keyring,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        let state = ChainState::open(store, config, keyring, clock)?;
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    pub fn admit(&self, block: Block) -> Result<ImportResult, LedgerError> {
        self.state.write().admit(block)
    }

    /// Parse and admit 512 wire bytes.
    pub fn admit_bytes(&self, raw: &[u8]) -> Result<ImportResult, LedgerError> {
        let block = Block::from_bytes(raw)?;
        self.admit(block)
    }

    /// Finalize the next eligible main-chain block, if any.
    pub fn check_finalization(&self) -> Result<Option<BlockAddress>, LedgerError> {
        self.state.write().check_finalization()
    }

    pub fn config(&self) -> ChainConfig {
        self.state.read().config.clone()
    }

    pub fn stats(&self) -> ChainStats {
        self.state.read().stats.clone()
    }

    pub fn head(&self) -> ChainHead {
        self.state.read().head.clone()
    }

    pub fn contains(&self, address: &BlockAddress) -> Result<bool, LedgerError> {
        self.state.read().contains(address)
    }

    pub fn block_info(&self, address: &BlockAddress) -> Result<Option<BlockInfo>, LedgerError> {
        self.state.read().read_info(address)
    }

    pub fn block(&self, address: &BlockAddress) -> Result<Option<Arc<Block>>, LedgerError> {
        self.state.read().read_block(address)
    }

    pub fn balance_of(&self, address: &BlockAddress) -> Result<Option<Amount>, LedgerError> {
        Ok(self.block_info(address)?.map(|info| info.balance))
    }

    pub fn main_block_at(&self, height: u64) -> Result<Option<BlockInfo>, LedgerError> {
        let state = self.state.read();
        match state.store.main_at_height(height)? {
            Some(address) => state.read_info(&address),
            None => Ok(None),
        }
    }

    /// Up to `count` finalized blocks, highest first.
    pub fn list_main_blocks(&self, count: usize) -> Result<Vec<BlockInfo>, LedgerError> {
        let state = self.state.read();
        let mut blocks = Vec::new();
        let mut height = state.stats.nmain;
        while height > 0 && blocks.len() < count {
            if let Some(address) = state.store.main_at_height(height)? {
                if let Some(info) = state.read_info(&address)? {
                    blocks.push(info);
                }
            }
            height -= 1;
        }
        Ok(blocks)
    }

    /// Up to `count` finalized, locally-owned blocks along the best-link path from the top.
    pub fn list_mined_blocks(&self, count: usize) -> Result<Vec<BlockInfo>, LedgerError> {
        let state = self.state.read();
        let mut blocks = Vec::new();
        let mut cursor = state.head.top;
        while let Some(address) = cursor {
            if blocks.len() >= count {
                break;
            }
            let Some(info) = state.read_info(&address)? else {
                break;
            };
            cursor = info.best_link;
            if info.flags.is_finalized() && info.flags.is_owned() {
                blocks.push(info);
            }
        }
        Ok(blocks)
    }

    /// Up to `count` durable tips strictly older than `send_time`, oldest first.
    pub fn orphans(&self, count: usize, send_time: Timestamp) -> Result<Vec<BlockAddress>, LedgerError> {
        let state = self.state.read();
        let not_after = Timestamp::new(send_time.ticks().saturating_sub(1));
        Ok(state.store.orphans(count, not_after)?)
    }

    pub fn extra_len(&self) -> usize {
        self.state.read().extra.len()
    }

    /// Locally-owned blocks, durable and pending, with their key index.
    pub fn our_blocks(&self) -> Result<Vec<(u32, BlockAddress)>, LedgerError> {
        let state = self.state.read();
        let mut blocks = state.store.our_blocks()?;
        blocks.extend(state.pending_ours.iter().map(|(address, index)| (*index, *address)));
        Ok(blocks)
    }

    /// Total balance of the blocks owned by `key_index`.
    pub fn spendable_balance(&self, key_index: u32) -> Result<Amount, LedgerError> {
        let mut total = Amount::ZERO;
        for (index, address) in self.our_blocks()? {
            if index != key_index {
                continue;
            }
            if let Some(balance) = self.balance_of(&address)? {
                total = total.checked_add(balance).unwrap_or(Amount::new(u64::MAX));
            }
        }
        Ok(total)
    }

    /// Block a new block sent at `send_time` should link for main-chain continuity.
    ///
    /// While the top is still in the open epoch it competes with the block
    /// being built, so the best tip of the previous epoch is used instead.
    pub fn pretop_for_link(&self, send_time: Timestamp) -> Result<Option<BlockAddress>, LedgerError> {
        let state = self.state.read();
        let Some(top) = state.head.top else {
            return Ok(None);
        };
        let top_time = state.read_info(&top)?.map(|info| info.timestamp);
        if top_time.is_some_and(|time| time.epoch() == send_time.epoch()) {
            Ok(state.head.pretop)
        } else {
            Ok(Some(top))
        }
    }
}
