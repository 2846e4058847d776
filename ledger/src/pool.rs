//! The bounded in-memory pool of not-yet-durable epoch-closing blocks.

use std::collections::{BTreeMap, HashMap};

use dagcore_types::BlockAddress;

/// Extra-pool membership in insertion order.
#[derive(Debug, Default)]
pub struct ExtraPool {
    order: BTreeMap<u64, BlockAddress>,
    index: HashMap<BlockAddress, u64>,
    next_seq: u64,
}

impl ExtraPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: BlockAddress) {
        if self.index.contains_key(&address) {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, address);
        self.index.insert(address, seq);
    }

    pub fn remove(&mut self, address: &BlockAddress) -> bool {
        match self.index.remove(address) {
            Some(seq) => {
                self.order.remove(&seq);
                true
            }
            None => false,
        }
    }

    /// The earliest inserted member.
    pub fn oldest(&self) -> Option<BlockAddress> {
        self.order.values().next().copied()
    }

    pub fn contains(&self, address: &BlockAddress) -> bool {
        self.index.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Members, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &BlockAddress> {
        self.order.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(n: u8) -> BlockAddress {
        BlockAddress::from_low_bytes([n; 24])
    }

    #[test]
    fn oldest_follows_insertion_order() {
        let mut pool = ExtraPool::new();
        pool.insert(address(3));
        pool.insert(address(1));
        pool.insert(address(2));
        assert_eq!(pool.oldest(), Some(address(3)));

        assert!(pool.remove(&address(3)));
        assert_eq!(pool.oldest(), Some(address(1)));
        assert_eq!(pool.iter().copied().collect::<Vec<_>>(), vec![address(1), address(2)]);
    }

    #[test]
    fn duplicate_insert_keeps_position() {
        let mut pool = ExtraPool::new();
        pool.insert(address(1));
        pool.insert(address(2));
        pool.insert(address(1));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.oldest(), Some(address(1)));
    }

    #[test]
    fn remove_missing() {
        let mut pool = ExtraPool::new();
        assert!(!pool.remove(&address(9)));
        assert!(pool.is_empty());
    }
}
