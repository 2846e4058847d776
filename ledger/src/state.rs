//! Engine state: the block arena, the extra pool, head and statistics.
//!
//! Blocks refer to each other (best link, finalizing reference) by
//! [`BlockAddress`]; every lookup goes through the arena, which lazily pulls
//! durable blocks from the store. Durable records are written back after every
//! mutation.

use std::collections::HashMap;
use std::sync::Arc;

use dagcore_crypto::Keyring;
use dagcore_store::{BlockInfo, ChainStore, StoreError};
use dagcore_types::{Amount, BlockAddress, BlockFlags, Clock, Difficulty};

use crate::head::{HEAD_KEY, STATS_KEY};
use crate::{Block, ChainConfig, ChainHead, ChainStats, ExtraPool, LedgerError};

/// A parsed block and its mutable record.
#[derive(Debug)]
pub(crate) struct BlockRecord {
    pub block: Arc<Block>,
    pub info: BlockInfo,
    /// Written to the store; false while the block sits in the extra pool.
    pub saved: bool,
}

/// Everything the write lock protects.
pub(crate) struct ChainState<S> {
    pub(crate) config: ChainConfig,
    pub(crate) store: Arc<S>,
    pub(crate) keyring: Keyring,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) arena: HashMap<BlockAddress, BlockRecord>,
    pub(crate) extra: ExtraPool,
    /// Ownership records of locally-owned blocks still in the extra pool.
    pub(crate) pending_ours: HashMap<BlockAddress, u32>,
    pub(crate) head: ChainHead,
    pub(crate) stats: ChainStats,
}

impl<S: ChainStore> ChainState<S> {
    pub(crate) fn open(
        store: Arc<S>,
        config: ChainConfig,
        keyring: Keyring,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, LedgerError> {
        let head: ChainHead = match store.get_meta(HEAD_KEY)? {
            Some(bytes) => bincode::deserialize(&bytes)?,
            None => ChainHead::default(),
        };
        let mut stats: ChainStats = match store.get_meta(STATS_KEY)? {
            Some(bytes) => bincode::deserialize(&bytes)?,
            None => ChainStats::default(),
        };
        // The extra pool does not survive a restart.
        stats.nblocks = stats.nblocks.saturating_sub(stats.nextra);
        stats.nextra = 0;

        let mut state = Self {
            config,
            store,
            keyring,
            clock,
            arena: HashMap::new(),
            extra: ExtraPool::new(),
            pending_ours: HashMap::new(),
            head,
            stats,
        };
        state.recover_head()?;
        tracing::debug!(
            nblocks = state.stats.nblocks,
            nmain = state.stats.nmain,
            top = ?state.head.top,
            "chain state loaded"
        );
        Ok(state)
    }

    /// Replace head pointers that referred to lost extra-pool blocks.
    fn recover_head(&mut self) -> Result<(), LedgerError> {
        if let Some(top) = self.head.top {
            if !self.store.exists(&top)? {
                tracing::warn!(%top, "top block was not durable, falling back to its best link");
                match self.head.top_link {
                    Some(link) => {
                        let info = self.info(&link)?;
                        let difficulty = info.difficulty.clone();
                        let best_link = info.best_link;
                        self.head.top = Some(link);
                        self.head.top_difficulty = difficulty;
                        self.head.top_link = best_link;
                    }
                    None => {
                        self.head.top = None;
                        self.head.top_difficulty = Difficulty::zero();
                    }
                }
                let difficulty = self.head.top_difficulty.clone();
                self.stats.set_difficulty(&difficulty);
            }
        }
        if let Some(pretop) = self.head.pretop {
            if !self.store.exists(&pretop)? {
                self.head.pretop = None;
                self.head.pretop_difficulty = Difficulty::zero();
            }
        }
        Ok(())
    }

    pub(crate) fn persist_head(&self) -> Result<(), LedgerError> {
        self.store
            .put_meta(HEAD_KEY, &bincode::serialize(&self.head)?)?;
        self.store
            .put_meta(STATS_KEY, &bincode::serialize(&self.stats)?)?;
        Ok(())
    }

    /// Bring a durable block into the arena. Returns false if the block is unknown.
    pub(crate) fn load(&mut self, address: &BlockAddress) -> Result<bool, LedgerError> {
        if self.arena.contains_key(address) {
            return Ok(true);
        }
        let Some(raw) = self.store.get_block(address)? else {
            return Ok(false);
        };
        let block = Block::from_bytes(&raw)?;
        let info = self.store.get_info(address)?.ok_or_else(|| {
            StoreError::Corruption(format!("block {address} has no info record"))
        })?;
        self.arena.insert(
            *address,
            BlockRecord {
                block: Arc::new(block),
                info,
                saved: true,
            },
        );
        Ok(true)
    }

    pub(crate) fn contains(&self, address: &BlockAddress) -> Result<bool, LedgerError> {
        Ok(self.arena.contains_key(address) || self.store.exists(address)?)
    }

    fn record(&mut self, address: &BlockAddress) -> Result<&BlockRecord, LedgerError> {
        if !self.load(address)? {
            return Err(LedgerError::UnknownBlock(*address));
        }
        self.arena
            .get(address)
            .ok_or(LedgerError::UnknownBlock(*address))
    }

    pub(crate) fn info(&mut self, address: &BlockAddress) -> Result<&BlockInfo, LedgerError> {
        Ok(&self.record(address)?.info)
    }

    pub(crate) fn block(&mut self, address: &BlockAddress) -> Result<Arc<Block>, LedgerError> {
        Ok(Arc::clone(&self.record(address)?.block))
    }

    pub(crate) fn flags(&mut self, address: &BlockAddress) -> Result<BlockFlags, LedgerError> {
        Ok(self.info(address)?.flags)
    }

    /// Mutate a block record, writing it through if the block is durable.
    pub(crate) fn update(
        &mut self,
        address: &BlockAddress,
        mutate: impl FnOnce(&mut BlockInfo),
    ) -> Result<(), LedgerError> {
        if !self.load(address)? {
            return Err(LedgerError::UnknownBlock(*address));
        }
        let record = self
            .arena
            .get_mut(address)
            .ok_or(LedgerError::UnknownBlock(*address))?;
        mutate(&mut record.info);
        if record.saved {
            self.store.put_info(&record.info)?;
        }
        Ok(())
    }

    pub(crate) fn set_flags(
        &mut self,
        address: &BlockAddress,
        flags: BlockFlags,
        value: bool,
    ) -> Result<(), LedgerError> {
        self.update(address, |info| info.flags.set(flags, value))
    }

    pub(crate) fn credit(&mut self, address: &BlockAddress, amount: Amount) -> Result<(), LedgerError> {
        let balance = self.info(address)?.balance;
        let updated = balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOutOfRange(*address))?;
        self.set_balance(address, updated)
    }

    pub(crate) fn debit(&mut self, address: &BlockAddress, amount: Amount) -> Result<(), LedgerError> {
        let balance = self.info(address)?.balance;
        let updated = balance
            .checked_sub(amount)
            .ok_or(LedgerError::BalanceOutOfRange(*address))?;
        self.set_balance(address, updated)
    }

    fn set_balance(&mut self, address: &BlockAddress, balance: Amount) -> Result<(), LedgerError> {
        let mut previous = Amount::ZERO;
        let mut owned = false;
        self.update(address, |info| {
            previous = info.balance;
            info.balance = balance;
            owned = info.flags.is_owned();
        })?;
        if owned {
            self.stats.balance = self
                .stats
                .balance
                .saturating_sub(previous)
                .saturating_add(balance);
        }
        Ok(())
    }

    /// Snapshot of a record without touching the arena.
    pub(crate) fn read_info(&self, address: &BlockAddress) -> Result<Option<BlockInfo>, LedgerError> {
        match self.arena.get(address) {
            Some(record) => Ok(Some(record.info.clone())),
            None => Ok(self.store.get_info(address)?),
        }
    }

    pub(crate) fn read_block(&self, address: &BlockAddress) -> Result<Option<Arc<Block>>, LedgerError> {
        if let Some(record) = self.arena.get(address) {
            return Ok(Some(Arc::clone(&record.block)));
        }
        match self.store.get_block(address)? {
            Some(raw) => Ok(Some(Arc::new(Block::from_bytes(&raw)?))),
            None => Ok(None),
        }
    }
}
