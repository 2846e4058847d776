//! Main-chain selection and reorganization.

use dagcore_store::ChainStore;
use dagcore_types::{BlockAddress, BlockFlags, Difficulty};

use crate::state::ChainState;
use crate::LedgerError;

impl<S: ChainStore> ChainState<S> {
    /// Make `new_top` the top and re-mark the main chain below it.
    pub(crate) fn select_main_chain(&mut self, new_top: BlockAddress) -> Result<(), LedgerError> {
        let old_top = self.head.top;
        let fork = self.find_fork(new_top)?;
        self.unwind(fork)?;
        self.mark_main_chain(new_top)?;

        let new_info = self.info(&new_top)?;
        let new_epoch = new_info.timestamp.epoch();
        let new_difficulty = new_info.difficulty.clone();
        let new_link = new_info.best_link;

        if let Some(old) = old_top.filter(|old| *old != new_top) {
            if self.load(&old)? {
                let old_info = self.info(&old)?;
                let old_epoch = old_info.timestamp.epoch();
                let old_difficulty = old_info.difficulty.clone();
                if old_epoch < new_epoch
                    && (self.head.pretop.is_none()
                        || old_difficulty > self.head.pretop_difficulty)
                {
                    self.head.pretop = Some(old);
                    self.head.pretop_difficulty = old_difficulty;
                }
            }
        }

        self.head.top = Some(new_top);
        self.head.top_difficulty = new_difficulty.clone();
        self.head.top_link = new_link;
        self.stats.set_difficulty(&new_difficulty);
        tracing::info!(top = %new_top, difficulty = %new_difficulty, fork = ?fork, "new top");
        Ok(())
    }

    /// The block whose main-chain status survives the switch to `new_top`.
    ///
    /// Walks best links from `new_top` to the first block already on the
    /// main chain. If that block shares an epoch with the earliest-epoch
    /// block that would be marked on the new path, the fork moves one step
    /// further back so the two same-epoch blocks compete on equal terms.
    fn find_fork(&mut self, new_top: BlockAddress) -> Result<Option<BlockAddress>, LedgerError> {
        let mut candidate: Option<(BlockAddress, u64)> = None;
        let mut cursor = Some(new_top);
        let mut fork = None;

        while let Some(address) = cursor {
            let info = self.info(&address)?;
            if info.flags.is_on_main_chain() {
                fork = Some(address);
                break;
            }
            let epoch = info.timestamp.epoch();
            let difficulty = info.difficulty.clone();
            let best_link = info.best_link;
            if self.would_mark(&difficulty, best_link, epoch, candidate.map(|c| c.1))? {
                candidate = Some((address, epoch));
            }
            cursor = best_link;
        }

        if let (Some(fork_address), Some((marked, marked_epoch))) = (fork, candidate) {
            let fork_info = self.info(&fork_address)?;
            if fork_address != marked && fork_info.timestamp.epoch() == marked_epoch {
                return Ok(fork_info.best_link);
            }
        }
        Ok(fork)
    }

    /// A block is marked when it adds work over its best link and lies in an
    /// earlier epoch than the last block marked on the same walk.
    fn would_mark(
        &mut self,
        difficulty: &Difficulty,
        best_link: Option<BlockAddress>,
        epoch: u64,
        last_marked_epoch: Option<u64>,
    ) -> Result<bool, LedgerError> {
        let adds_work = match best_link {
            None => true,
            Some(link) => *difficulty > self.info(&link)?.difficulty,
        };
        Ok(adds_work && last_marked_epoch.map_or(true, |last| last > epoch))
    }

    /// Clear main-chain status from the old top back to `fork` (exclusive),
    /// reversing any finalized blocks on the way.
    fn unwind(&mut self, fork: Option<BlockAddress>) -> Result<(), LedgerError> {
        let mut cursor = self.head.top;
        while let Some(address) = cursor {
            if Some(address) == fork || !self.load(&address)? {
                break;
            }
            let info = self.info(&address)?;
            let finalized = info.flags.is_finalized();
            let next = info.best_link;
            self.set_flags(&address, BlockFlags::MAIN_CHAIN, false)?;
            if finalized {
                self.unfinalize(&address)?;
            }
            cursor = next;
        }
        Ok(())
    }

    fn mark_main_chain(&mut self, new_top: BlockAddress) -> Result<(), LedgerError> {
        let mut last_marked_epoch = None;
        let mut cursor = Some(new_top);
        while let Some(address) = cursor {
            let info = self.info(&address)?;
            if info.flags.is_on_main_chain() {
                break;
            }
            let epoch = info.timestamp.epoch();
            let difficulty = info.difficulty.clone();
            let best_link = info.best_link;
            if self.would_mark(&difficulty, best_link, epoch, last_marked_epoch)? {
                self.set_flags(&address, BlockFlags::MAIN_CHAIN, true)?;
                last_marked_epoch = Some(epoch);
            }
            cursor = best_link;
        }
        Ok(())
    }
}
