//! Finalization of main-chain blocks and the balance effects it triggers.
//!
//! Applying a finalized block walks everything it transitively references
//! that no earlier finalization has claimed. Both directions use an explicit
//! work stack so that deep reference chains cannot exhaust the call stack.
//! Reversal visits blocks in the exact opposite order of application, so every
//! intermediate balance it passes through is one that existed before.

use std::collections::{BTreeMap, HashSet};

use dagcore_store::ChainStore;
use dagcore_types::{Amount, BlockAddress, BlockFlags};

use crate::state::ChainState;
use crate::{Block, LedgerError};

struct ApplyFrame {
    address: BlockAddress,
    links: Vec<BlockAddress>,
    next: usize,
}

struct UnapplyFrame {
    address: BlockAddress,
    /// Links still to visit, popped from the back.
    pending: Vec<BlockAddress>,
}

/// Net balance changes of one block's application.
///
/// The block's fee leaves it and goes to the beneficiary: the block that
/// applied it, or the block itself when it is the finalized root.
struct Transfers {
    /// Total drawn from each input source.
    inputs: BTreeMap<BlockAddress, Amount>,
    sum_in: Amount,
    /// Outputs plus fee.
    sum_out: Amount,
    deltas: BTreeMap<BlockAddress, i128>,
}

impl Transfers {
    /// `None` when an input or output sum overflows.
    fn of(block: &Block, beneficiary: BlockAddress) -> Option<Self> {
        let fee = block.fee();
        let mut inputs: BTreeMap<BlockAddress, Amount> = BTreeMap::new();
        let mut deltas: BTreeMap<BlockAddress, i128> = BTreeMap::new();
        let mut sum_in = Amount::ZERO;
        let mut sum_out = fee;

        for input in block.inputs() {
            sum_in = sum_in.checked_add(input.amount)?;
            let drawn = inputs.entry(input.address).or_default();
            *drawn = drawn.checked_add(input.amount)?;
            *deltas.entry(input.address).or_default() -= i128::from(input.amount.raw());
        }
        for output in block.outputs() {
            sum_out = sum_out.checked_add(output.amount)?;
            *deltas.entry(output.address).or_default() += i128::from(output.amount.raw());
        }
        *deltas.entry(block.address()).or_default() +=
            i128::from(sum_in.raw()) - i128::from(sum_out.raw());
        *deltas.entry(beneficiary).or_default() += i128::from(fee.raw());

        Some(Self {
            inputs,
            sum_in,
            sum_out,
            deltas,
        })
    }
}

impl<S: ChainStore> ChainState<S> {
    /// Promote at most one main-chain block to finalized.
    ///
    /// The candidate is the deepest main-chain block above the last finalized
    /// one. It is promoted when another main-chain block sits above it, a
    /// later block references it, and it has aged past the confirmation delay.
    pub(crate) fn check_finalization(&mut self) -> Result<Option<BlockAddress>, LedgerError> {
        let now = self.clock.now();
        let mut depth = 0u64;
        let mut candidate = None;
        let mut cursor = self.head.top;

        while let Some(address) = cursor {
            let info = self.info(&address)?;
            if info.flags.is_finalized() {
                break;
            }
            if info.flags.is_on_main_chain() {
                candidate = Some((address, info.flags, info.timestamp));
                depth += 1;
            }
            cursor = info.best_link;
        }

        let Some((address, flags, timestamp)) = candidate else {
            return Ok(None);
        };
        if depth > 1
            && flags.is_referenced()
            && timestamp.has_aged(self.config.confirmation_delay, now)
        {
            self.finalize(&address)?;
            self.persist_head()?;
            return Ok(Some(address));
        }
        Ok(None)
    }

    pub(crate) fn finalize(&mut self, address: &BlockAddress) -> Result<(), LedgerError> {
        let height = self.stats.nmain + 1;
        let reward = self.config.reward_at(height);

        self.update(address, |info| {
            info.flags.insert(BlockFlags::MAIN);
            info.height = height;
        })?;
        self.credit(address, reward)?;
        self.stats.main_added();

        if self.apply(*address)? {
            let own = *address;
            self.update(address, |info| info.finalizing_ref = Some(own))?;
        }
        self.store.put_main_height(height, address)?;

        tracing::info!(%address, height, %reward, "block finalized");
        Ok(())
    }

    pub(crate) fn unfinalize(&mut self, address: &BlockAddress) -> Result<(), LedgerError> {
        let height = self.info(address)?.height;
        let reward = self.config.reward_at(height);

        self.unapply(*address)?;
        self.debit(address, reward)?;
        self.set_flags(address, BlockFlags::MAIN, false)?;
        self.stats.main_removed();

        if height > 0 {
            self.store.delete_main_height(height)?;
        }
        self.update(address, |info| info.height = 0)?;

        tracing::info!(%address, height, "block unfinalized");
        Ok(())
    }

    /// Apply `root` and everything it references that is not yet processed,
    /// children before parents. `root` keeps its own fee. Returns `false` if
    /// `root` was already processed.
    pub(crate) fn apply(&mut self, root: BlockAddress) -> Result<bool, LedgerError> {
        if self.flags(&root)?.is_processed() {
            return Ok(false);
        }
        self.set_flags(&root, BlockFlags::MAIN_REF, true)?;
        let mut stack = vec![self.apply_frame(root)?];

        loop {
            let Some(frame) = stack.last_mut() else {
                return Ok(true);
            };
            if frame.next < frame.links.len() {
                let child = frame.links[frame.next];
                frame.next += 1;
                if !self.flags(&child)?.is_processed() {
                    self.set_flags(&child, BlockFlags::MAIN_REF, true)?;
                    let child_frame = self.apply_frame(child)?;
                    stack.push(child_frame);
                }
                continue;
            }

            let address = frame.address;
            stack.pop();
            match stack.last() {
                Some(parent) => {
                    let parent = parent.address;
                    self.settle(&address, parent)?;
                    self.update(&address, |info| info.finalizing_ref = Some(parent))?;
                }
                None => {
                    self.settle(&address, address)?;
                    return Ok(true);
                }
            }
        }
    }

    fn apply_frame(&mut self, address: BlockAddress) -> Result<ApplyFrame, LedgerError> {
        Ok(ApplyFrame {
            address,
            links: self.link_addresses(&address)?,
            next: 0,
        })
    }

    fn link_addresses(&mut self, address: &BlockAddress) -> Result<Vec<BlockAddress>, LedgerError> {
        Ok(self.block(address)?.links().map(|link| link.address).collect())
    }

    /// Execute the transfers of one block. Insufficient funds or a balance
    /// leaving the representable range leave every balance unchanged.
    fn settle(&mut self, address: &BlockAddress, beneficiary: BlockAddress) -> Result<(), LedgerError> {
        let block = self.block(address)?;
        let Some(transfers) = Transfers::of(&block, beneficiary) else {
            tracing::warn!(%address, "transfer sum overflows");
            return Ok(());
        };

        for (source, drawn) in &transfers.inputs {
            if self.info(source)?.balance < *drawn {
                tracing::debug!(%address, %source, "inputs exceed source balance");
                return Ok(());
            }
        }
        let balance = self.info(address)?.balance;
        match balance.checked_add(transfers.sum_in) {
            Some(available) if available >= transfers.sum_out => {}
            _ => {
                tracing::debug!(%address, "insufficient funds");
                return Ok(());
            }
        }
        for (target, delta) in &transfers.deltas {
            let after = i128::from(self.info(target)?.balance.raw()) + delta;
            if u64::try_from(after).is_err() {
                tracing::warn!(%address, %target, "transfer would overflow a balance, skipped");
                return Ok(());
            }
        }

        self.adjust_all(&transfers.deltas, false)?;
        self.set_flags(address, BlockFlags::APPLIED, true)?;
        Ok(())
    }

    fn adjust_all(&mut self, deltas: &BTreeMap<BlockAddress, i128>, reverse: bool) -> Result<(), LedgerError> {
        for (target, delta) in deltas {
            let delta = if reverse { -delta } else { *delta };
            let amount = u64::try_from(delta.unsigned_abs())
                .map(Amount::new)
                .map_err(|_| LedgerError::BalanceOutOfRange(*target))?;
            if delta >= 0 {
                self.credit(target, amount)?;
            } else {
                self.debit(target, amount)?;
            }
        }
        Ok(())
    }

    /// Reverse `apply` for `root` and every block whose finalizing reference
    /// points back along the walk, parents before children and links in
    /// reverse order.
    pub(crate) fn unapply(&mut self, root: BlockAddress) -> Result<(), LedgerError> {
        self.revert(&root)?;
        let mut stack = vec![UnapplyFrame {
            address: root,
            pending: self.pending_links(&root)?,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(child) = frame.pending.pop() else {
                stack.pop();
                continue;
            };
            let parent = frame.address;
            let info = self.info(&child)?;
            if info.finalizing_ref == Some(parent) && info.flags.is_processed() {
                self.revert(&child)?;
                let pending = self.pending_links(&child)?;
                stack.push(UnapplyFrame {
                    address: child,
                    pending,
                });
            }
        }
        Ok(())
    }

    /// Distinct links in first-seen order. Popping from the back visits them
    /// in reverse.
    fn pending_links(&mut self, address: &BlockAddress) -> Result<Vec<BlockAddress>, LedgerError> {
        let mut seen = HashSet::new();
        let mut links = self.link_addresses(address)?;
        links.retain(|link| seen.insert(*link));
        Ok(links)
    }

    /// Undo one block's own transfers and clear its processing marks.
    fn revert(&mut self, address: &BlockAddress) -> Result<(), LedgerError> {
        let info = self.info(address)?;
        let applied = info.flags.is_applied();
        let beneficiary = info.finalizing_ref.unwrap_or(*address);
        if applied {
            let block = self.block(address)?;
            let transfers = Transfers::of(&block, beneficiary)
                .ok_or(LedgerError::BalanceOutOfRange(*address))?;
            self.adjust_all(&transfers.deltas, true)?;
        }
        self.update(address, |info| {
            info.flags.remove(BlockFlags::APPLIED | BlockFlags::MAIN_REF);
            info.finalizing_ref = None;
        })?;
        Ok(())
    }
}
