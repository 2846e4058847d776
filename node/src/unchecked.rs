//! Blocks waiting for a linked block that has not arrived yet.
//!
//! Entries are keyed by the missing address. When that block is admitted its
//! dependents are drained and resubmitted; a dependent may then park again
//! under a different missing link.

use std::collections::{HashMap, HashSet};

use dagcore_ledger::Block;
use dagcore_types::BlockAddress;

#[derive(Clone, Debug)]
struct UncheckedEntry {
    block: Block,
    /// Unix seconds when the entry was parked.
    received_at: u64,
}

/// Bounded map of `missing address -> waiting blocks`.
#[derive(Debug)]
pub struct UncheckedMap {
    entries: HashMap<BlockAddress, Vec<UncheckedEntry>>,
    /// Addresses of every parked block, to ignore repeats.
    parked: HashSet<BlockAddress>,
    max_size: usize,
}

impl UncheckedMap {
    pub fn new(max_size: usize) -> Self {
        Self {
            entries: HashMap::new(),
            parked: HashSet::new(),
            max_size,
        }
    }

    /// Park `block` until `dependency` arrives.
    ///
    /// Returns `false` if the map is full or the block is already parked.
    pub fn insert(&mut self, dependency: BlockAddress, block: Block, now: u64) -> bool {
        if self.parked.len() >= self.max_size {
            return false;
        }
        if !self.parked.insert(block.address()) {
            return false;
        }
        self.entries.entry(dependency).or_default().push(UncheckedEntry {
            block,
            received_at: now,
        });
        true
    }

    /// Drain every block that was waiting for `address`, in arrival order.
    pub fn take_dependents(&mut self, address: &BlockAddress) -> Vec<Block> {
        let Some(entries) = self.entries.remove(address) else {
            return Vec::new();
        };
        entries
            .into_iter()
            .map(|entry| {
                self.parked.remove(&entry.block.address());
                entry.block
            })
            .collect()
    }

    pub fn contains(&self, address: &BlockAddress) -> bool {
        self.parked.contains(address)
    }

    pub fn len(&self) -> usize {
        self.parked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parked.is_empty()
    }

    /// Remove entries older than `max_age_secs` relative to `now`.
    ///
    /// Returns the number of entries removed.
    pub fn clear_expired(&mut self, max_age_secs: u64, now: u64) -> usize {
        let parked = &mut self.parked;
        let mut removed = 0;
        self.entries.retain(|_dependency, entries| {
            entries.retain(|entry| {
                let fresh = now.saturating_sub(entry.received_at) < max_age_secs;
                if !fresh {
                    parked.remove(&entry.block.address());
                    removed += 1;
                }
                fresh
            });
            !entries.is_empty()
        });
        removed
    }
}
