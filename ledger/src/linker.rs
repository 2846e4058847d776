//! Block admission: validation, linking, pool membership.

use std::fmt;
use std::sync::Arc;

use dagcore_store::{BlockInfo, ChainStore};
use dagcore_types::{BlockAddress, BlockFlags, Difficulty, Timestamp};

use crate::state::{BlockRecord, ChainState};
use crate::{Block, LedgerError};

/// Why a block was permanently rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvalidReason {
    /// Header field kind does not match the configured network.
    WrongNetwork,
    FutureTimestamp,
    /// Timestamp precedes the network era.
    BeforeEra,
    /// The linked block is not strictly older than the linking block.
    LinkNotOlder(BlockAddress),
    /// No verified key of the block matches the input's output signature.
    UnauthorizedInput(BlockAddress),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongNetwork => write!(f, "header does not match the network"),
            Self::FutureTimestamp => write!(f, "timestamp is too far in the future"),
            Self::BeforeEra => write!(f, "timestamp precedes the network era"),
            Self::LinkNotOlder(address) => write!(f, "link {address} is not older than the block"),
            Self::UnauthorizedInput(address) => write!(f, "input {address} is not authorized"),
        }
    }
}

/// Outcome of admitting a block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportResult {
    /// Already admitted; nothing changed.
    Exists,
    /// A linked block is unknown. Fetch it and admit this block again.
    NoParent(BlockAddress),
    Invalid(InvalidReason),
    /// Admitted. `new_best` is set when the block became the new top.
    Accepted { new_best: bool },
}

impl ImportResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// How a linked block leaves tip status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RemoveMode {
    /// Referenced by a durable block: durable tips leave the orphan store,
    /// extra blocks are flushed and release their own links.
    Normal,
    /// Referenced by an extra block: only extra targets are touched.
    Extra,
    /// Capacity eviction: the block is dropped.
    Reuse,
}

impl<S: ChainStore> ChainState<S> {
    pub(crate) fn admit(&mut self, block: Block) -> Result<ImportResult, LedgerError> {
        let address = block.address();
        let now = self.clock.now();

        if let Some(reason) = self.check_header(&block, now) {
            tracing::debug!(%address, %reason, "block rejected");
            return Ok(ImportResult::Invalid(reason));
        }
        if self.contains(&address)? {
            return Ok(ImportResult::Exists);
        }

        let mut is_extra = block.is_main_candidate();
        for link in block.links() {
            if !self.load(&link.address)? {
                tracing::debug!(%address, missing = %link.address, "linked block is unknown");
                return Ok(ImportResult::NoParent(link.address));
            }
            if self.info(&link.address)?.timestamp >= block.timestamp() {
                let reason = InvalidReason::LinkNotOlder(link.address);
                tracing::debug!(%address, %reason, "block rejected");
                return Ok(ImportResult::Invalid(reason));
            }
            if !link.amount.is_zero() {
                is_extra = false;
            }
        }

        if let Some(input) = self.unauthorized_input(&block)? {
            let reason = InvalidReason::UnauthorizedInput(input);
            tracing::debug!(%address, %reason, "block rejected");
            return Ok(ImportResult::Invalid(reason));
        }

        let owner = self
            .keyring
            .find_index(|key| block.is_out_signed_by(key))
            .map(|index| index as u32);

        let links: Vec<BlockAddress> = block.links().map(|link| link.address).collect();
        let mode = if is_extra {
            RemoveMode::Extra
        } else {
            RemoveMode::Normal
        };
        for link in links {
            self.release(link, mode)?;
        }

        let (difficulty, best_link) = self.compute_difficulty(&block)?;

        let timestamp = block.timestamp();
        if difficulty > self.head.pretop_difficulty && timestamp.epoch() <= now.epoch() {
            self.head.pretop = Some(address);
            self.head.pretop_difficulty = difficulty.clone();
        }

        let mut info = BlockInfo::new(address, block.hash(), timestamp, block.fee());
        info.difficulty = difficulty.clone();
        info.best_link = best_link;
        info.flags.set(BlockFlags::REMARK, block.remark().is_some());
        info.flags.set(BlockFlags::EXTRA, is_extra);
        info.flags.set(BlockFlags::OURS, owner.is_some());

        if is_extra {
            self.extra.insert(address);
            self.stats.nextra += 1;
            if let Some(index) = owner {
                self.pending_ours.insert(address, index);
            }
        } else {
            self.store.put_block(&address, block.as_bytes())?;
            self.store.put_info(&info)?;
            self.store.add_orphan(&address, timestamp)?;
            self.stats.nnoref += 1;
            if let Some(index) = owner {
                self.store.save_our_block(index, &address)?;
            }
        }
        self.arena.insert(
            address,
            BlockRecord {
                block: Arc::new(block),
                info,
                saved: !is_extra,
            },
        );
        self.stats.block_added();

        self.enforce_extra_cap(&address)?;

        let new_best = difficulty > self.head.top_difficulty;
        if new_best {
            self.select_main_chain(address)?;
        }
        self.persist_head()?;

        tracing::debug!(%address, %difficulty, extra = is_extra, new_best, "block accepted");
        Ok(ImportResult::Accepted { new_best })
    }

    fn check_header(&self, block: &Block, now: Timestamp) -> Option<InvalidReason> {
        if block.header_type() != self.config.network.header_type() {
            return Some(InvalidReason::WrongNetwork);
        }
        if block.timestamp() > now.saturating_add(self.config.max_future_drift) {
            return Some(InvalidReason::FutureTimestamp);
        }
        if block.timestamp() < self.config.era {
            return Some(InvalidReason::BeforeEra);
        }
        None
    }

    /// First input whose source block was not output-signed by one of this
    /// block's verified keys.
    fn unauthorized_input(&mut self, block: &Block) -> Result<Option<BlockAddress>, LedgerError> {
        if block.inputs().is_empty() {
            return Ok(None);
        }
        let keys = block.verified_keys();
        for input in block.inputs() {
            let source = self.block(&input.address)?;
            if !keys.iter().any(|key| source.is_out_signed_by(key)) {
                return Ok(Some(input.address));
            }
        }
        Ok(None)
    }

    /// Take a block out of tip status.
    pub(crate) fn release(&mut self, start: BlockAddress, mode: RemoveMode) -> Result<(), LedgerError> {
        let mut stack = vec![(start, mode)];
        while let Some((address, mode)) = stack.pop() {
            if !self.load(&address)? {
                continue;
            }
            let flags = self.flags(&address)?;
            if flags.is_referenced() || (mode == RemoveMode::Extra && !flags.is_extra()) {
                continue;
            }

            if flags.is_extra() {
                self.extra.remove(&address);
                self.stats.nextra = self.stats.nextra.saturating_sub(1);
                if mode == RemoveMode::Reuse {
                    self.drop_extra(&address);
                    continue;
                }
                let block = self.flush(&address)?;
                for link in block.links() {
                    stack.push((link.address, RemoveMode::Normal));
                }
            } else {
                self.store.remove_orphan(&address)?;
                self.stats.nnoref = self.stats.nnoref.saturating_sub(1);
            }
            self.set_flags(&address, BlockFlags::REF, true)?;
        }
        Ok(())
    }

    /// Write an extra block to the store. The caller has already taken it out of the pool.
    fn flush(&mut self, address: &BlockAddress) -> Result<Arc<Block>, LedgerError> {
        let record = self
            .arena
            .get_mut(address)
            .ok_or(LedgerError::UnknownBlock(*address))?;
        record.info.flags.remove(BlockFlags::EXTRA);
        record.saved = true;
        self.store.put_block(address, record.block.as_bytes())?;
        self.store.put_info(&record.info)?;
        let block = Arc::clone(&record.block);
        if let Some(index) = self.pending_ours.remove(address) {
            self.store.save_our_block(index, address)?;
        }
        Ok(block)
    }

    fn drop_extra(&mut self, address: &BlockAddress) {
        self.arena.remove(address);
        self.pending_ours.remove(address);
        self.stats.block_dropped();
        if self.head.pretop == Some(*address) {
            self.head.pretop = None;
            self.head.pretop_difficulty = Difficulty::zero();
        }
    }

    /// Evict oldest extra blocks until the pool fits its cap again.
    fn enforce_extra_cap(&mut self, admitted: &BlockAddress) -> Result<(), LedgerError> {
        while self.extra.len() > self.config.max_extra_blocks {
            let Some(oldest) = self.extra.oldest() else {
                break;
            };
            if oldest == *admitted {
                break;
            }
            if self.flags(&oldest)?.is_on_main_chain() {
                // The current top: keep it, durable and still a tip.
                tracing::warn!(address = %oldest, "extra pool full, persisting main-chain block");
                self.extra.remove(&oldest);
                self.stats.nextra = self.stats.nextra.saturating_sub(1);
                let block = self.flush(&oldest)?;
                self.store.add_orphan(&oldest, block.timestamp())?;
                self.stats.nnoref += 1;
                for link in block.links() {
                    self.release(link.address, RemoveMode::Normal)?;
                }
            } else {
                tracing::warn!(address = %oldest, "extra pool full, dropping oldest block");
                self.release(oldest, RemoveMode::Reuse)?;
            }
        }
        Ok(())
    }
}
